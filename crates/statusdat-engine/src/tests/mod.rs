use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A trimmed-down status.dat as written by Nagios.
pub const SAMPLE_STATUS: &str = "\
########################################
#          NAGIOS STATUS FILE
########################################

info {
\tcreated=1357997000
\tversion=3.4.1
\t}

hoststatus {
\thost_name=server1
\tcurrent_state=0
\tplugin_output=PING OK - Packet loss = 0%, RTA = 0.80 ms
\t}

servicestatus {
\thost_name=server1
\tservice_description=HTTP
\tplugin_output=HTTP OK: HTTP/1.1 200 OK - 612 bytes in 0.001 second response time
\t}
";

/// Create a temporary directory for status files
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Create a status file with content
pub fn create_status_file(dir: &TempDir, filename: &str, content: &str) -> PathBuf {
    let file_path = dir.path().join(filename);
    fs::write(&file_path, content).unwrap();
    file_path
}
