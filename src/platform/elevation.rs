/// Whether the process can detach kernel drivers and open arbitrary USB
/// devices without udev rules.
#[cfg(unix)]
pub fn is_elevated() -> bool {
    // On Unix, check if running as root
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
pub fn is_elevated() -> bool {
    false
}
