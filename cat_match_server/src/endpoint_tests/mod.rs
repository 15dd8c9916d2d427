mod helpers;
mod matches;
mod mocks;
