use crate::{
    error::{FormatError, FormatResult},
    types::*,
};

/// Sector counts and byte offsets for every region of one image.
///
/// Offsets are absolute from the start of the image. The filesystem region
/// size doubles as the byte distance between the directory entry and the
/// kernel payload.
pub struct Layout {
    pub size_in_bytes:       u64,
    pub kernel_size:         u64,
    pub fsystem_bytes:       u64,
    pub sectors_for_kernel:  u64,
    pub sectors_for_fsystem: u64,
    pub sectors_combined:    u64,
}

impl Layout {
    pub fn plan(size_in_bytes: u64, kernel_size: u64) -> FormatResult<Layout> {
        if size_in_bytes <= ESP_LENGTH_BYTES {
            return Err(FormatError::ImageTooSmall {
                size: size_in_bytes,
            });
        }
        if kernel_size == 0 {
            return Err(FormatError::EmptyKernel);
        }
        // a partial trailing sector still occupies a whole one
        let sectors_for_kernel = kernel_size.div_ceil(SECTOR_SIZE);
        let fsystem_bytes = size_in_bytes / BLOCK_SIZE;
        let sectors_for_fsystem = fsystem_bytes / SECTOR_SIZE;
        Ok(Layout {
            size_in_bytes,
            kernel_size,
            fsystem_bytes,
            sectors_for_kernel,
            sectors_for_fsystem,
            sectors_combined: sectors_for_kernel + sectors_for_fsystem,
        })
    }

    pub const fn signature_offset() -> u64 {
        ESP_LENGTH_BYTES
    }

    pub const fn entry_offset() -> u64 {
        ESP_LENGTH_BYTES + SDFS_SIGNATURE.len() as u64 + SIGNATURE_PADDING.len() as u64
    }

    /// Unused bytes between the directory entry and the kernel payload,
    /// skipped without zeroing.
    pub fn gap_length(&self) -> u64 {
        self.fsystem_bytes - ENTRY_SIZE
    }

    pub fn kernel_offset(&self) -> u64 {
        Self::entry_offset() + ENTRY_SIZE + self.gap_length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_sectors_round_up() {
        assert_eq!(Layout::plan(ESP_LENGTH_BYTES + 1, 1).unwrap().sectors_for_kernel, 1);
        assert_eq!(Layout::plan(ESP_LENGTH_BYTES + 1, 512).unwrap().sectors_for_kernel, 1);
        assert_eq!(Layout::plan(ESP_LENGTH_BYTES + 1, 513).unwrap().sectors_for_kernel, 2);
        assert_eq!(Layout::plan(ESP_LENGTH_BYTES + 1, 1024).unwrap().sectors_for_kernel, 2);
    }

    #[test]
    fn example_disk_layout() {
        // 200 MiB image with a 10000 byte kernel
        let layout = Layout::plan(200 * 1024 * 1024, 10_000).unwrap();
        assert_eq!(layout.sectors_for_kernel, 20);
        assert_eq!(layout.fsystem_bytes, 51_200);
        assert_eq!(layout.sectors_for_fsystem, 100);
        assert_eq!(layout.sectors_combined, 120);
    }

    #[test]
    fn region_offsets() {
        let layout = Layout::plan(ESP_LENGTH_BYTES + 1000, 700).unwrap();
        assert_eq!(Layout::signature_offset(), ESP_LENGTH_BYTES);
        assert_eq!(Layout::entry_offset(), ESP_LENGTH_BYTES + 16);
        assert_eq!(layout.fsystem_bytes, 25_600);
        assert_eq!(layout.gap_length(), 25_600 - ENTRY_SIZE);
        assert_eq!(layout.kernel_offset(), ESP_LENGTH_BYTES + 16 + 25_600);
    }

    #[test]
    fn rejects_undersized_image() {
        assert!(matches!(
            Layout::plan(ESP_LENGTH_BYTES, 512),
            Err(FormatError::ImageTooSmall { .. })
        ));
        assert!(matches!(
            Layout::plan(1024, 512),
            Err(FormatError::ImageTooSmall { .. })
        ));
    }

    #[test]
    fn rejects_empty_kernel() {
        assert!(matches!(
            Layout::plan(ESP_LENGTH_BYTES + 1000, 0),
            Err(FormatError::EmptyKernel)
        ));
    }
}
