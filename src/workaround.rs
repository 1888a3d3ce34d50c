//! Conditional directory fixes run before build tasks.
//!
//! Jenkins cores in `[1.545, 1.592)` expect a `target` directory to exist when
//! plugin tests start, and cores older than `1.598` leave one behind that
//! `clean` has to remove (JENKINS-26331). Both fixes live in a plain ordered
//! table that [`Workarounds::before_task`] evaluates against an explicitly
//! passed core version.

use core::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::{error::Error, fs::Filesystem, range, version::ParseError};

/// When a workaround applies, in terms of the platform version.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Version is strictly older than `upper`.
    OlderThan { upper: String },
    /// Version lies in `[lower, upper)`.
    Between { lower: String, upper: String },
}

impl Condition {
    pub fn older_than(upper: &str) -> Self {
        Condition::OlderThan { upper: upper.into() }
    }

    pub fn between(lower: &str, upper: &str) -> Self {
        Condition::Between {
            lower: lower.into(),
            upper: upper.into(),
        }
    }

    pub fn matches(&self, version: &str) -> Result<bool, ParseError> {
        match self {
            Condition::OlderThan { upper } => range::is_older_than(version, upper),
            Condition::Between { lower, upper } => range::is_between(version, lower, upper),
        }
    }
}

impl Display for Condition {
    fn fmt(&self, fmt: &mut Formatter) -> Result<(), fmt::Error> {
        match self {
            Condition::OlderThan { upper } => write!(fmt, "older than {}", upper),
            Condition::Between { lower, upper } => write!(fmt, "in [{}, {})", lower, upper),
        }
    }
}

/// Side effect of a workaround. Paths are relative to the project directory.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    CreateDir(PathBuf),
    DeleteDir(PathBuf),
}

impl Action {
    #[inline]
    pub fn path(&self) -> &Path {
        match self {
            Action::CreateDir(path) | Action::DeleteDir(path) => path,
        }
    }

    fn perform<F: Filesystem + ?Sized>(&self, path: &Path, fs: &F) -> Result<(), Error> {
        let res = match self {
            Action::CreateDir(..) => fs.create_dir_all(path),
            Action::DeleteDir(..) => fs.remove_dir_all(path),
        };

        res.map_err(|cause| Error::Io {
            path: path.into(),
            cause,
        })
    }
}

impl Display for Action {
    fn fmt(&self, fmt: &mut Formatter) -> Result<(), fmt::Error> {
        match self {
            Action::CreateDir(path) => write!(fmt, "create directory {}", path.display()),
            Action::DeleteDir(path) => write!(fmt, "delete directory {}", path.display()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Workaround {
    /// Name of the task this runs before.
    pub task: String,
    pub condition: Condition,
    pub action: Action,
}

impl Workaround {
    pub fn new(task: &str, condition: Condition, action: Action) -> Self {
        Self {
            task: task.into(),
            condition,
            action,
        }
    }
}

impl Display for Workaround {
    fn fmt(&self, fmt: &mut Formatter) -> Result<(), fmt::Error> {
        write!(fmt, "before {}: {} if version is {}", self.task, self.action, self.condition)
    }
}

/// An action that was performed, with its path resolved against the project directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub action: Action,
    pub path: PathBuf,
}

impl Display for Applied {
    fn fmt(&self, fmt: &mut Formatter) -> Result<(), fmt::Error> {
        match self.action {
            Action::CreateDir(..) => write!(fmt, "created {}", self.path.display()),
            Action::DeleteDir(..) => write!(fmt, "deleted {}", self.path.display()),
        }
    }
}

/// Ordered table of workarounds.
#[derive(Debug, Clone, Default)]
pub struct Workarounds {
    entries: Vec<Workaround>,
}

impl Workarounds {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the JENKINS-26331 table.
    pub fn jenkins_26331() -> Self {
        Self::new()
            .with(Workaround::new(
                "test",
                Condition::between("1.545", "1.592"),
                Action::CreateDir("target".into()),
            ))
            .with(Workaround::new(
                "clean",
                Condition::older_than("1.598"),
                Action::DeleteDir("target".into()),
            ))
    }

    /// Appends an entry. Entries for the same task run in insertion order.
    pub fn with(mut self, workaround: Workaround) -> Self {
        self.entries.push(workaround);
        self
    }

    #[inline]
    pub fn entries(&self) -> &[Workaround] {
        &self.entries
    }

    /// Returns names of tasks that have at least one entry, in table order.
    pub fn tasks(&self) -> Vec<&str> {
        let mut tasks: Vec<&str> = Vec::new();
        for workaround in &self.entries {
            if !tasks.contains(&workaround.task.as_str()) {
                tasks.push(&workaround.task);
            }
        }

        tasks
    }

    /// Returns entries for `task` whose condition holds for `version`, without
    /// performing anything.
    ///
    /// Every condition is evaluated, so a malformed version fails here even if
    /// an earlier entry would have matched.
    pub fn plan(&self, task: &str, version: &str) -> Result<Vec<&Workaround>, ParseError> {
        let mut planned = Vec::new();

        for workaround in self.entries.iter().filter(|w| w.task == task) {
            if workaround.condition.matches(version)? {
                planned.push(workaround);
            } else {
                debug!(
                    "skipping '{}' before {}: version {} is not {}",
                    workaround.action, task, version, workaround.condition
                );
            }
        }

        Ok(planned)
    }

    /// Runs every matching entry for `task` against `project_dir`.
    ///
    /// Nothing touches the filesystem unless all conditions evaluate cleanly.
    pub fn before_task<F>(&self, task: &str, version: &str, project_dir: &Path, fs: &F) -> Result<Vec<Applied>, Error>
    where
        F: Filesystem + ?Sized,
    {
        let planned = self.plan(task, version)?;

        let mut applied = Vec::with_capacity(planned.len());
        for workaround in planned {
            let path = project_dir.join(workaround.action.path());
            info!(
                "applying workaround before {} for version {}: {}",
                task,
                version,
                workaround.action
            );

            workaround.action.perform(&path, fs)?;
            applied.push(Applied {
                action: workaround.action.clone(),
                path,
            });
        }

        Ok(applied)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use std::{cell::RefCell, io};

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Create(PathBuf),
        Remove(PathBuf),
    }

    #[derive(Default)]
    struct RecordingFs {
        ops: RefCell<Vec<Op>>,
        fail: bool,
    }

    impl Filesystem for RecordingFs {
        fn create_dir_all(&self, path: &Path) -> io::Result<()> {
            if self.fail {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
            }
            self.ops.borrow_mut().push(Op::Create(path.into()));
            Ok(())
        }

        fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
            if self.fail {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
            }
            self.ops.borrow_mut().push(Op::Remove(path.into()));
            Ok(())
        }
    }

    #[test]
    fn test_test_task_in_range_creates_target() {
        let fs = RecordingFs::default();
        let applied = Workarounds::jenkins_26331()
            .before_task("test", "1.580", Path::new("/plugin"), &fs)
            .unwrap();

        assert_eq!(
            vec![Applied {
                action: Action::CreateDir("target".into()),
                path: "/plugin/target".into(),
            }],
            applied
        );
        assert_eq!(vec![Op::Create("/plugin/target".into())], *fs.ops.borrow());
    }

    #[test]
    fn test_test_task_out_of_range_does_nothing() {
        let workarounds = Workarounds::jenkins_26331();

        for version in &["1.540", "1.592", "1.600", "2.0"] {
            let fs = RecordingFs::default();
            let applied = workarounds
                .before_task("test", version, Path::new("/plugin"), &fs)
                .unwrap();

            assert!(applied.is_empty(), "{}", version);
            assert!(fs.ops.borrow().is_empty(), "{}", version);
        }
    }

    #[test]
    fn test_clean_task_older_than_1_598_deletes_target() {
        let fs = RecordingFs::default();
        let applied = Workarounds::jenkins_26331()
            .before_task("clean", "1.597", Path::new("/plugin"), &fs)
            .unwrap();

        assert_eq!(1, applied.len());
        assert_eq!(vec![Op::Remove("/plugin/target".into())], *fs.ops.borrow());
    }

    #[test]
    fn test_clean_task_from_1_598_does_nothing() {
        let fs = RecordingFs::default();
        let applied = Workarounds::jenkins_26331()
            .before_task("clean", "1.598", Path::new("/plugin"), &fs)
            .unwrap();

        assert!(applied.is_empty());
        assert!(fs.ops.borrow().is_empty());
    }

    #[test]
    fn test_jenkins_2_0_beta_skips_both_workarounds() {
        let workarounds = Workarounds::jenkins_26331();

        for task in &["test", "clean"] {
            let fs = RecordingFs::default();
            let applied = workarounds
                .before_task(task, "2.0-beta-1", Path::new("/plugin"), &fs)
                .unwrap();

            assert!(applied.is_empty(), "{}", task);
            assert!(fs.ops.borrow().is_empty(), "{}", task);
        }
    }

    #[test]
    fn test_unknown_task_does_nothing() {
        let fs = RecordingFs::default();
        let applied = Workarounds::jenkins_26331()
            .before_task("jar", "1.580", Path::new("/plugin"), &fs)
            .unwrap();

        assert!(applied.is_empty());
    }

    #[test]
    fn test_malformed_version_fails_before_side_effects() {
        let workarounds = Workarounds::new()
            .with(Workaround::new(
                "clean",
                Condition::older_than("1.598"),
                Action::DeleteDir("target".into()),
            ))
            .with(Workaround::new(
                "clean",
                Condition::older_than("bogus"),
                Action::DeleteDir("work".into()),
            ));

        let fs = RecordingFs::default();
        let err = workarounds
            .before_task("clean", "1.500", Path::new("/plugin"), &fs)
            .unwrap_err();

        match err {
            Error::Parse(..) => {}
            err => panic!("unexpected {:?}", err),
        }
        assert!(fs.ops.borrow().is_empty());
    }

    #[test]
    fn test_malformed_platform_version() {
        let fs = RecordingFs::default();
        let err = Workarounds::jenkins_26331()
            .before_task("test", "", Path::new("/plugin"), &fs)
            .unwrap_err();

        match err {
            Error::Parse(ParseError::Empty) => {}
            err => panic!("unexpected {:?}", err),
        }
    }

    #[test]
    fn test_io_error_carries_path() {
        let fs = RecordingFs {
            fail: true,
            ..Default::default()
        };
        let err = Workarounds::jenkins_26331()
            .before_task("test", "1.580", Path::new("/plugin"), &fs)
            .unwrap_err();

        match err {
            Error::Io { path, .. } => assert_eq!(PathBuf::from("/plugin/target"), path),
            err => panic!("unexpected {:?}", err),
        }
    }

    #[test]
    fn test_entries_run_in_order() {
        let workarounds = Workarounds::new()
            .with(Workaround::new(
                "clean",
                Condition::older_than("1.598"),
                Action::DeleteDir("target".into()),
            ))
            .with(Workaround::new(
                "clean",
                Condition::between("1.500", "1.600"),
                Action::CreateDir("target".into()),
            ));

        let fs = RecordingFs::default();
        workarounds
            .before_task("clean", "1.550", Path::new("p"), &fs)
            .unwrap();

        assert_eq!(
            vec![Op::Remove("p/target".into()), Op::Create("p/target".into())],
            *fs.ops.borrow()
        );
    }

    #[test]
    fn test_plan() {
        let workarounds = Workarounds::jenkins_26331();

        let planned = workarounds.plan("test", "1.545").unwrap();
        assert_eq!(1, planned.len());
        assert_eq!(Action::CreateDir("target".into()), planned[0].action);

        assert!(workarounds.plan("test", "1.544").unwrap().is_empty());
        assert!(workarounds.plan("clean", "1.x").is_err());
    }

    #[test]
    fn test_tasks() {
        assert_eq!(vec!["test", "clean"], Workarounds::jenkins_26331().tasks());
        assert!(Workarounds::new().tasks().is_empty());
    }

    #[test]
    fn test_display() {
        let workarounds = Workarounds::jenkins_26331();
        let entries = workarounds.entries();

        assert_eq!(
            "before test: create directory target if version is in [1.545, 1.592)",
            &format!("{}", entries[0])
        );
        assert_eq!(
            "before clean: delete directory target if version is older than 1.598",
            &format!("{}", entries[1])
        );
    }

    #[test]
    fn test_with_local_fs() {
        use crate::fs::LocalFs;

        let dir = tempfile::tempdir().unwrap();
        let workarounds = Workarounds::jenkins_26331();

        workarounds.before_task("test", "1.591", dir.path(), &LocalFs).unwrap();
        assert!(dir.path().join("target").is_dir());

        workarounds.before_task("clean", "1.591", dir.path(), &LocalFs).unwrap();
        assert!(!dir.path().join("target").exists());
    }
}
