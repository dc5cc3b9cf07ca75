//! Test utilities for the backend crate.
//!
//! Shared by unit tests in `src/` and integration tests in `tests/`. Only
//! compiled for tests or with the `test-support` feature.

pub mod cap_fs {
    //! Capability-safe filesystem helpers for tests.
    //!
    //! The backend forbids direct `std::fs` calls. These helpers wrap
    //! `cap_std::fs::Dir` so test suites share policy-compliant file access.

    use std::ffi::OsString;
    use std::io;
    use std::path::Path;

    use cap_std::{ambient_authority, fs::Dir};

    /// Write bytes to a file through `cap_std`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use poi_backend::test_support::cap_fs::{path_exists, write_file};
    ///
    /// let path = std::env::temp_dir().join("cap-fs-write-example.txt");
    /// write_file(&path, b"upload\n")?;
    /// assert!(path_exists(&path));
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn write_file(path: &Path, contents: &[u8]) -> io::Result<()> {
        let (parent, file_name) = parent_and_file_name(path)?;
        let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
        directory.write(Path::new(&file_name), contents)
    }

    /// Return true when `path` exists, false when it does not.
    pub fn path_exists(path: &Path) -> bool {
        let Ok((parent, file_name)) = parent_and_file_name(path) else {
            return false;
        };
        let Ok(directory) = Dir::open_ambient_dir(parent, ambient_authority()) else {
            return false;
        };
        directory.exists(Path::new(&file_name))
    }

    /// Remove a single file.
    pub fn remove_file(path: &Path) -> io::Result<()> {
        let (parent, file_name) = parent_and_file_name(path)?;
        let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
        directory.remove_file(Path::new(&file_name))
    }

    /// Count the entries directly inside `path`.
    pub fn count_entries(path: &Path) -> io::Result<usize> {
        let directory = Dir::open_ambient_dir(path, ambient_authority())?;
        let mut count = 0;
        for entry in directory.entries()? {
            entry?;
            count += 1;
        }
        Ok(count)
    }

    fn parent_and_file_name(path: &Path) -> io::Result<(&Path, OsString)> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let file_name = path.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "path must include a file or directory name",
            )
        })?;
        Ok((parent, file_name.to_os_string()))
    }
}

pub mod clock {
    //! Deterministic clock for import timestamps.

    use chrono::{DateTime, Local, TimeZone, Utc};
    use mockable::Clock;

    /// Clock frozen at a single instant.
    #[derive(Debug, Clone, Copy)]
    pub struct FixtureClock {
        utc_now: DateTime<Utc>,
    }

    impl FixtureClock {
        /// Clock frozen at `utc_now`.
        pub fn at(utc_now: DateTime<Utc>) -> Self {
            Self { utc_now }
        }
    }

    impl Default for FixtureClock {
        fn default() -> Self {
            Self::at(fixture_timestamp())
        }
    }

    impl Clock for FixtureClock {
        fn local(&self) -> DateTime<Local> {
            self.utc_now.with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            self.utc_now
        }
    }

    /// Instant returned by [`FixtureClock::default`].
    pub fn fixture_timestamp() -> DateTime<Utc> {
        match Utc.with_ymd_and_hms(2026, 3, 2, 9, 15, 0).single() {
            Some(timestamp) => timestamp,
            None => panic!("valid fixture timestamp"),
        }
    }
}

pub mod poi_store;
