use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Colours log records the way diagnostics are coloured on the terminal.
#[derive(Debug,Clone,Copy)]
pub struct ChainLogger{
    level:LevelFilter
}

impl ChainLogger {
    pub fn new(level:LevelFilter)->Self{
        Self{level}
    }
    pub fn init(level:LevelFilter)->Result<(),SetLoggerError>{
        log::set_boxed_logger(Box::new(ChainLogger::new(level)))?;
        log::set_max_level(level);
        Ok(())
    }
    pub fn format(record:&Record)->String{
        let level=record.level();
        match level {
            Level::Error=>format!("\x1b[31m[{level}]:{}\x1b[0m",record.args()),
            Level::Warn=>format!("\x1b[33m[{level}]:{}\x1b[0m",record.args()),
            Level::Info=>format!("\x1b[32m[{level}]:{}\x1b[0m",record.args()),
            Level::Debug|Level::Trace=>format!("\x1b[2m  ╰─▶[{level}]:{}\x1b[0m",record.args()),
        }
    }
}

impl Log for ChainLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level()<=self.level
    }
    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()){
            eprintln!("{}",ChainLogger::format(record));
        }
    }
    fn flush(&self) {}
}

/// Warn by default; each `-v` raises one level, `--quiet` keeps only errors.
pub fn level_from_flags(verbose:u8,quiet:bool)->LevelFilter{
    if quiet{
        return LevelFilter::Error
    }
    match verbose {
        0=>LevelFilter::Warn,
        1=>LevelFilter::Info,
        2=>LevelFilter::Debug,
        _=>LevelFilter::Trace
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_flags(){
        assert_eq!(level_from_flags(0,false),LevelFilter::Warn);
        assert_eq!(level_from_flags(2,false),LevelFilter::Debug);
        assert_eq!(level_from_flags(7,false),LevelFilter::Trace);
        assert_eq!(level_from_flags(3,true),LevelFilter::Error);
    }

    #[test]
    fn records_are_coloured_by_level(){
        assert_eq!(
            ChainLogger::format(&Record::builder().level(Level::Warn).args(format_args!("statement skipped")).build()),
            "\x1b[33m[WARN]:statement skipped\x1b[0m"
        );
        let logger=ChainLogger::new(LevelFilter::Warn);
        assert!(!logger.enabled(&Metadata::builder().level(Level::Debug).build()));
    }
}
