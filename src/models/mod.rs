pub mod extrawork;
pub mod intent;
pub mod query;
pub mod resource;
pub mod settings;

pub use extrawork::*;
pub use intent::*;
pub use query::*;
pub use resource::*;
pub use settings::*;
