use std::io;

pub type FormatResult<T> = Result<T, FormatError>;

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("disk image is too small to hold the reserved area ({size} bytes)")]
    ImageTooSmall { size: u64 },
    #[error("failed to seek past the reserved area: {0}")]
    Seek(#[source] io::Error),
    #[error("kernel image is empty")]
    EmptyKernel,
    #[error("{field} sector count {value} does not fit in 41 bits")]
    SectorOverflow { field: &'static str, value: u64 },
    #[error("failed to write the image: {0}")]
    Write(#[source] io::Error),
    #[error("kernel payload does not match its checksum after writing")]
    VerifyMismatch,
}
