pub mod ask;
pub mod doctor;
pub mod index;
pub mod onboard;
pub mod pipeline;
pub mod serve;
