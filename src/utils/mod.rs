pub mod environment;
pub mod paths;
pub mod terminal;

pub use environment::{get_claude_dir, resolve_claude_dir};
pub use paths::{
    decode_project_name, format_path_with_tilde, safe_open_file, validate_file_size,
    validate_path_not_symlink,
};
pub use terminal::strip_ansi_codes;
