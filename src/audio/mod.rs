pub mod capture;
pub mod devices;
pub mod mic_check;
pub mod playback;
pub mod recorder;
pub mod wav;
