use std::fmt;

/// Errors raised while assembling a draw call.
///
/// The vertex and fragment stages themselves cannot fail; these only come
/// out of the construction-time entry points (uniform decoding, define
/// parsing, atlas construction).
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolError {
    /// A uniform buffer's byte length does not match its block layout.
    UniformSize {
        block: &'static str,
        expected: usize,
        actual: usize,
    },
    /// A uniform buffer is not aligned for its block type.
    UniformAlignment { block: &'static str },
    /// A specialization define that the symbol program does not know.
    UnknownDefine(String),
    /// Atlas pixel data length disagrees with its dimensions.
    AtlasSize {
        width: u32,
        height: u32,
        actual: usize,
    },
}

impl fmt::Display for SymbolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolError::UniformSize { block, expected, actual } => write!(
                f,
                "uniform block {block}: expected {expected} bytes, got {actual}"
            ),
            SymbolError::UniformAlignment { block } => {
                write!(f, "uniform block {block}: buffer is misaligned")
            }
            SymbolError::UnknownDefine(name) => {
                write!(f, "unknown symbol shader define `{name}`")
            }
            SymbolError::AtlasSize { width, height, actual } => write!(
                f,
                "atlas {width}x{height} needs {} bytes, got {actual}",
                *width as usize * *height as usize
            ),
        }
    }
}

impl std::error::Error for SymbolError {}
