pub mod pet_panel;
pub mod scratchpad;
pub mod xp_bar;
