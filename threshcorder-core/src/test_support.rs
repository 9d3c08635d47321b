use std::cell::{Cell, RefCell};
use std::fs;
use std::io::{self, Cursor, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

static COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Scratch directory under the system temp dir, removed on drop.
pub struct TestDir {
    path: PathBuf,
}

impl TestDir {
    pub fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "threshcorder_test_{}_{}_{}",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::Relaxed),
            name
        ));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TestDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// In-memory sink that can be told to fail a write.
///
/// With `fail_after = Some(n)`, the next `n` bytes go through, the write after
/// that fails once, and the sink then behaves normally again.
#[derive(Clone, Default)]
pub struct FlakySink {
    data: Rc<RefCell<Cursor<Vec<u8>>>>,
    pub fail_after: Rc<Cell<Option<usize>>>,
}

impl FlakySink {
    pub fn bytes(&self) -> Vec<u8> {
        self.data.borrow().get_ref().clone()
    }
}

impl Write for FlakySink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.fail_after.get() {
            Some(0) => {
                self.fail_after.set(None);
                Err(io::Error::new(io::ErrorKind::Other, "disk full"))
            }
            Some(budget) => {
                let n = budget.min(buf.len());
                self.fail_after.set(Some(budget - n));
                self.data.borrow_mut().write(&buf[..n])
            }
            None => self.data.borrow_mut().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for FlakySink {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.data.borrow_mut().seek(pos)
    }
}
