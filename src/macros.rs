// Logging facade. Every event goes to the `section_storage` target; without the `tracing`
// feature the arguments are discarded at expansion time.

#[cfg(feature = "tracing")]
macro_rules! storage_event {
    ($level:ident, $($tt:tt)*) => {
        tracing::$level!(target: "section_storage", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! storage_event {
    ($level:ident, $($tt:tt)*) => {};
}

macro_rules! strace {
    ($($tt:tt)*) => { storage_event!(trace, $($tt)*) };
}

macro_rules! sdebug {
    ($($tt:tt)*) => { storage_event!(debug, $($tt)*) };
}

macro_rules! swarn {
    ($($tt:tt)*) => { storage_event!(warn, $($tt)*) };
}
