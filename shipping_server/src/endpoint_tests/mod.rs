mod helpers;
mod mocks;
mod poll;
mod tracking;
