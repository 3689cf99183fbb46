//! Console logging setup.
//!
//! The core crate styles its own status lines, so the console format is
//! message-only; RUST_LOG overrides the default info level as usual.

use std::io::Write;

pub fn init() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            if record.level() <= log::Level::Warn {
                writeln!(buf, "{}: {}", record.level(), record.args())
            } else {
                writeln!(buf, "{}", record.args())
            }
        })
        .init();
}
