// Example: batch removal reports original positions, and deferred mode coalesces delivery.
use section_storage::{Position, Storage, StorageUpdate, UpdateMode};

fn main() {
    let mut storage = Storage::new();
    storage.add_items(["a", "b", "c"], 0);
    storage.add_items(["d", "e", "f"], 1);

    storage.set_observer(|update: &StorageUpdate| {
        for change in update {
            println!("  {:?} {:?} {:?}", change.kind(), change.positions(), change.indices());
        }
    });

    println!("remove (0,1) (0,2) (1,0) (1,2):");
    storage.remove_items_at([
        Position::new(0, 1),
        Position::new(0, 2),
        Position::new(1, 0),
        Position::new(1, 2),
    ]);
    println!(
        "sections now: {:?} / {:?}",
        storage.items(0).unwrap_or_default(),
        storage.items(1).unwrap_or_default()
    );

    // Many edits, one refresh.
    storage.set_update_mode(UpdateMode::Deferred);
    storage.add_item("g", 2);
    storage.remove_items(&["a"]);
    println!("pending changes: {}", storage.pending_update().len());
    println!("flush:");
    storage.flush();
}
