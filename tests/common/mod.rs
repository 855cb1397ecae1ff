#![allow(dead_code)]

pub mod cascades;
pub mod synthetic_image;
