mod system;

pub use system::{PERSONA, system_prompt};
