pub mod shader;
pub mod uniform;
pub mod vertex;
