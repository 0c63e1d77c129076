mod booth_event;
mod booth_screen;
mod flow_error;

pub(crate) use {booth_event::BoothEvent, booth_screen::BoothScreen, flow_error::FlowError};
