// Purpose - external interfaces: input-device lookup tables

pub mod keymap;
