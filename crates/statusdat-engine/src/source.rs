use std::cell::RefCell;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Where a status file is read from.
///
/// Each render opens the source afresh and closes it when the pass ends.
/// Standard input and a caller-supplied reader can only be consumed once.
pub enum InputSource {
    Path(PathBuf),
    Stdin,
    Text(String),
    /// Any stream; handed over to the first render that opens it.
    Reader(RefCell<Option<Box<dyn BufRead>>>),
}

impl InputSource {
    pub fn path(path: impl AsRef<Path>) -> Self {
        InputSource::Path(path.as_ref().to_path_buf())
    }

    pub fn text(text: impl Into<String>) -> Self {
        InputSource::Text(text.into())
    }

    pub fn reader(reader: impl BufRead + 'static) -> Self {
        let reader: Box<dyn BufRead> = Box::new(reader);
        InputSource::Reader(RefCell::new(Some(reader)))
    }

    /// `-` means standard input, anything else is a path.
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            InputSource::Stdin
        } else {
            InputSource::path(arg)
        }
    }

    pub fn open(&self) -> io::Result<Box<dyn BufRead + '_>> {
        match self {
            InputSource::Path(path) => Ok(Box::new(BufReader::new(File::open(path)?))),
            InputSource::Stdin => Ok(Box::new(io::stdin().lock())),
            InputSource::Text(text) => Ok(Box::new(text.as_bytes())),
            InputSource::Reader(slot) => slot.borrow_mut().take().ok_or_else(|| {
                io::Error::new(io::ErrorKind::UnexpectedEof, "stream already consumed")
            }),
        }
    }
}

impl fmt::Debug for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::Path(path) => f.debug_tuple("Path").field(path).finish(),
            InputSource::Stdin => f.write_str("Stdin"),
            InputSource::Text(text) => f.debug_tuple("Text").field(text).finish(),
            InputSource::Reader(slot) => f
                .debug_struct("Reader")
                .field("consumed", &slot.borrow().is_none())
                .finish(),
        }
    }
}

/// Readers have no value to compare; one only equals itself.
impl PartialEq for InputSource {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (InputSource::Path(a), InputSource::Path(b)) => a == b,
            (InputSource::Stdin, InputSource::Stdin) => true,
            (InputSource::Text(a), InputSource::Text(b)) => a == b,
            (InputSource::Reader(_), InputSource::Reader(_)) => std::ptr::eq(self, other),
            _ => false,
        }
    }
}

impl Eq for InputSource {}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::Path(path) => write!(f, "{}", path.display()),
            InputSource::Stdin => f.write_str("-"),
            InputSource::Text(_) => f.write_str("<text>"),
            InputSource::Reader(_) => f.write_str("<stream>"),
        }
    }
}

impl From<PathBuf> for InputSource {
    fn from(path: PathBuf) -> Self {
        InputSource::Path(path)
    }
}

impl From<&Path> for InputSource {
    fn from(path: &Path) -> Self {
        InputSource::path(path)
    }
}
