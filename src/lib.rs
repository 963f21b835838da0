pub mod ai;
pub mod clock;
pub mod collisions;
pub mod compute;
pub mod entities;
pub mod error;
pub mod headless;
pub mod input;
pub mod logging;
pub mod outcome;
pub mod particles;
pub mod profile;
pub mod projectiles;
pub mod question;
pub mod quiz;
pub mod services;
pub mod spawner;
