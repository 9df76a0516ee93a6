pub mod synthetic_clump;
