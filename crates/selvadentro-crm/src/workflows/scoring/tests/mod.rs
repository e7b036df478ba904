mod common;
mod leads;
