use std::{
    io::{stdin, stdout, Write},
    path::{Path, PathBuf},
};

use console::style;

pub fn get_disk_path(path: &Path) -> PathBuf {
    if !path.exists() {
        println!(
            "{}: {}",
            style("disk image does not exist").red(),
            path.display()
        );
        std::process::exit(4);
    }
    path.to_owned()
}

pub fn get_kernel_path(path: &Path) -> PathBuf {
    if !path.exists() {
        println!(
            "{}: {}",
            style("kernel image does not exist").red(),
            path.display()
        );
        std::process::exit(5);
    }
    path.to_owned()
}

/// Ask before overwriting an existing filesystem. Only the literal `SDFS`,
/// in any case, confirms.
pub fn confirm_reformat() -> bool {
    println!(
        "{}",
        style("an SDFS filesystem is already present on this image").yellow()
    );
    print!(
        "reformat and overwrite it? enter '{}' to confirm: ",
        style("SDFS").bold()
    );
    let _ = stdout().flush();
    let mut input = String::new();
    if stdin().read_line(&mut input).is_err() {
        return false;
    }
    input.trim().eq_ignore_ascii_case("SDFS")
}
