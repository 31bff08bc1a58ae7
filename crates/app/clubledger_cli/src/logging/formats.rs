use std::io::Write;

use flexi_logger::{DeferredNow, style};
use log::Record;

/// `HH:MM:SS.mmm LEVEL [module] message`
pub fn cli_format(
    w: &mut dyn Write,
    now: &mut DeferredNow,
    record: &Record,
) -> Result<(), std::io::Error> {
    let level = record.level();
    write!(
        w,
        "{} {} [{}] {}",
        now.format("%H:%M:%S%.3f"),
        style(level).paint(level.to_string()),
        record.module_path().unwrap_or("<unnamed>"),
        record.args()
    )
}
