#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    ParseText,
    RebuildText,
    RunQa,
    DetectEncoding,
    ArchiveList,
    ArchiveRead,
    ArchiveWrite,
    ArchiveApply,
    Unknown,
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "ping" => Command::Ping,
            "parse_text" => Command::ParseText,
            "rebuild_text" => Command::RebuildText,
            "run_qa" => Command::RunQa,
            "detect_encoding" | "encoding.detect" => Command::DetectEncoding,
            "archive.list" => Command::ArchiveList,
            "archive.read" => Command::ArchiveRead,
            "archive.write" => Command::ArchiveWrite,
            "archive.apply" => Command::ArchiveApply,
            _ => Command::Unknown,
        }
    }
}
