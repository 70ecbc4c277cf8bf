mod path_ext;

pub use path_ext::{BestEffortPathExt, RelativePathExt, SEPARATOR, normalize_relative};
