//! Domain constants shared across the repository.

/// Name of the always-loaded, implicitly imported fallback model.
pub const SYSTEM_MODEL: &str = "System";

/// Separates the model segment of a qualifier.
pub const PATH_DELIMITER: char = '/';
/// Terminates the item type prefix of a qualifier.
pub const TYPE_DELIMITER: char = ':';
/// Introduces the object path of a qualifier.
pub const OBJECT_DELIMITER: char = '.';
/// Reserved list separator; never valid inside an identifier.
pub const LIST_DELIMITER: char = ';';

/// File name of the model descriptor inside a model directory.
pub const MODEL_DESCRIPTOR: &str = "model.xml";
/// Extension of persisted item files.
pub const ITEM_FILE_EXTENSION: &str = "xml";

/// Default prefix below each resource root that holds bundled models.
pub const DEFAULT_RESOURCE_PREFIX: &str = "models";
/// Default primary model root, relative to the working directory.
pub const DEFAULT_MODEL_ROOT: &str = "models";

/// Model sub-directories holding compiled code artifacts.
pub const CLASS_DIRS: &[&str] = &["classes", "target/classes"];
/// Model sub-directories holding libraries.
pub const LIBRARY_DIRS: &[&str] = &["lib", "extlib"];
/// Extensions recognized as native plugin libraries.
pub const NATIVE_LIBRARY_EXTENSIONS: &[&str] = &["so", "dylib", "dll"];

// Environment variables read by `RepositoryConfig::from_env`.
pub const ENV_ROOT: &str = "PROCMODEL_ROOT";
pub const ENV_ADDITIONAL_ROOTS: &str = "PROCMODEL_ADDITIONAL_ROOTS";
pub const ENV_RESOURCE_ROOTS: &str = "PROCMODEL_RESOURCE_ROOTS";
pub const ENV_RESOURCE_PREFIX: &str = "PROCMODEL_RESOURCE_PREFIX";
pub const ENV_MODELS: &str = "PROCMODEL_MODELS";
pub const ENV_RELOAD_ON_RESET: &str = "PROCMODEL_RELOAD_ON_RESET";
