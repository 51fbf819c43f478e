//! Built-in decay channels.

pub mod helamp;
pub mod helicity;
pub mod phsp;
pub mod vpho_isr;
pub mod vss;

pub use helamp::HelAmp;
pub use helicity::TwoBodyHelicity;
pub use phsp::Phsp;
pub use vpho_isr::VphoToVIsrHi;
pub use vss::Vss;
