// SmartMark services
// Services provide stateless or self-contained functionality: categories, view projection, local storage and settings.

pub mod category_registry;
pub mod local_storage;
pub mod settings_engine;
pub mod view_projector;
