// Physical constants for MPM simulation
use bevy::prelude::*;

// Global physics
pub const GRAVITY: Vec2 = Vec2::new(0.0, -80.0);

// Equation of state parameters for weakly compressible fluids
pub const EOS_STIFFNESS: f32 = 2.5;
pub const EOS_POWER: u8 = 4;

// Default dynamic viscosity for fluid particles
pub const DYNAMIC_VISCOSITY: f32 = 0.001;
