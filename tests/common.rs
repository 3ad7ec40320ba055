//! Shared sandbox for the CLI tests. The fake `tide` programs are `/bin/sh`
//! scripts relying on GNU `date`, so every test file using this is Unix-only.
#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use tempfile::TempDir;

pub const STATION: &str = "Test Harbor, Test Bay";

/// Two tides a day from the `-b` day through the `-e` day, in XTide's CSV format.
pub const WINDOW: &str = r#"#!/bin/sh
d=$(echo "$4" | cut -d' ' -f1)
end=$(echo "$6" | cut -d' ' -f1)
while :; do
  echo "Test Harbor| Test Bay,$d,4:03 AM UTC,6.34 ft,High Tide"
  echo "Test Harbor| Test Bay,$d,10:40 AM UTC,0.12 ft,Low Tide"
  [ "$d" = "$end" ] && break
  d=$(date -u -d "$d + 1 day" +%Y-%m-%d)
done
"#;

pub const SLEEPER: &str = "#!/bin/sh\nexec sleep 5\n";

pub const GARBAGE: &str = "#!/bin/sh\necho 'no tides here'\necho 'or here'\n";

pub const FATAL: &str = "#!/bin/sh\n\
echo 'XTide Fatal Error:  STATION_NOT_FOUND' >&2\n\
echo 'Could not find: Nowhere' >&2\n\
exit 3\n";

/// One South African high tide on the `-b` day, stamped in SAST.
pub const CAPE_TOWN: &str = r#"#!/bin/sh
d=$(echo "$4" | cut -d' ' -f1)
echo "Cape Town| South Africa,$d,3:12 AM SAST,1.52 m,High Tide"
"#;

/// Indian Standard Time or Irish Standard Time: nothing to go on.
pub const CHENNAI: &str = r#"#!/bin/sh
d=$(echo "$4" | cut -d' ' -f1)
echo "Chennai| India,$d,5:41 AM IST,0.98 m,High Tide"
"#;

/// Exits 0 but only complains on stderr.
pub const STDERR_ONLY: &str = "#!/bin/sh\n\
echo 'Warning: station not in index' >&2\n\
exit 0\n";

pub fn tdc() -> Command {
    cargo_bin_cmd!("tidecache")
}

/// A throwaway directory holding a config file, a database and fake
/// `tide` programs.
pub struct Sandbox {
    pub dir: TempDir,
    pub db: String,
    pub config: String,
}

impl Sandbox {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = dir.path().join("tides.sqlite").to_string_lossy().to_string();
        let config = dir
            .path()
            .join("tidecache.conf")
            .to_string_lossy()
            .to_string();
        Self { dir, db, config }
    }

    /// Write an executable script and return its path.
    pub fn script(&self, name: &str, body: &str) -> String {
        let path = self.dir.path().join(name);
        // written and closed before anyone can exec it
        fs::write(&path, body).expect("write script");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");
        path.to_string_lossy().to_string()
    }

    pub fn write_config(&self, program: &str, timeout_secs: u64) {
        let yaml = format!(
            "location: \"{STATION}\"\nprogram: \"{program}\"\ndays: 3\ntimeout_secs: {timeout_secs}\n"
        );
        fs::write(&self.config, yaml).expect("write config");
    }

    /// `tidecache --db <db> --config-file <config>`
    pub fn cmd(&self) -> Command {
        let mut cmd = tdc();
        cmd.args(["--db", &self.db, "--config-file", &self.config]);
        cmd
    }

    /// Rows in `tide_events`, read directly.
    pub fn count(&self) -> i64 {
        let conn = rusqlite::Connection::open(&self.db).expect("open db");
        conn.query_row("SELECT COUNT(*) FROM tide_events", [], |r| r.get(0))
            .expect("count")
    }
}
