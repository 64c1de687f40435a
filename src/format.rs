use std::{
    hash::Hasher,
    io::{Read, Seek, SeekFrom, Write},
};

use twox_hash::XxHash64;

use crate::{
    error::{FormatError, FormatResult},
    layout::Layout,
    types::*,
};

pub const HASH_SEED: u64 = 8416774756550;

const CHUNK_SIZE: usize = 1 << 20;

pub struct SignatureProbe {
    pub size_in_bytes: u64,
    pub formatted:     bool,
}

/// Read the signature region without modifying the image, reporting the
/// image size and whether an SDFS filesystem is already present.
pub fn probe_signature<D: Read + Seek>(disk: &mut D) -> FormatResult<SignatureProbe> {
    let size_in_bytes = disk.seek(SeekFrom::End(0)).map_err(FormatError::Seek)?;
    if size_in_bytes <= ESP_LENGTH_BYTES {
        return Err(FormatError::ImageTooSmall {
            size: size_in_bytes,
        });
    }
    disk.seek(SeekFrom::Start(ESP_LENGTH_BYTES))
        .map_err(FormatError::Seek)?;
    let mut signature = [0u8; SDFS_SIGNATURE.len()];
    disk.read_exact(&mut signature).map_err(FormatError::Seek)?;
    Ok(SignatureProbe {
        size_in_bytes,
        formatted: signature == SDFS_SIGNATURE,
    })
}

/// Write the filesystem header and the kernel payload into `disk`.
/// The data is written subsequently in the following order:
/// - signature
/// - padding
/// - directory entry
/// - relative seek over the filesystem gap
/// - kernel payload
pub fn write_format<D, P>(
    disk: &mut D, layout: &Layout, entry: &DirectoryEntry, kernel: &[u8], mut progress: P,
) -> FormatResult<()>
where
    D: Write + Seek,
    P: FnMut(u64),
{
    disk.seek(SeekFrom::Start(Layout::signature_offset()))
        .map_err(FormatError::Write)?;
    disk.write_all(&SDFS_SIGNATURE).map_err(FormatError::Write)?;
    disk.write_all(&SIGNATURE_PADDING)
        .map_err(FormatError::Write)?;
    disk.write_all(entry.as_bytes()).map_err(FormatError::Write)?;
    disk.seek(SeekFrom::Current(layout.gap_length() as i64))
        .map_err(FormatError::Write)?;
    for chunk in kernel.chunks(CHUNK_SIZE) {
        disk.write_all(chunk).map_err(FormatError::Write)?;
        progress(chunk.len() as u64);
    }
    Ok(())
}

pub fn hash_kernel(kernel: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(HASH_SEED);
    hasher.write(kernel);
    hasher.finish()
}

/// Read the written payload region back and compare its checksum against the
/// hash of the buffered kernel image.
pub fn verify_kernel<D: Read + Seek>(
    disk: &mut D, layout: &Layout, expected: u64,
) -> FormatResult<()> {
    disk.seek(SeekFrom::Start(layout.kernel_offset()))
        .map_err(FormatError::Write)?;
    let mut hasher = XxHash64::with_seed(HASH_SEED);
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut remaining = layout.kernel_size;
    while remaining > 0 {
        let len = remaining.min(CHUNK_SIZE as u64) as usize;
        disk.read_exact(&mut buffer[..len])
            .map_err(FormatError::Write)?;
        hasher.write(&buffer[..len]);
        remaining -= len as u64;
    }
    if hasher.finish() != expected {
        return Err(FormatError::VerifyMismatch);
    }
    Ok(())
}
