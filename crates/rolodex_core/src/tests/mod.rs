mod fixtures;

mod listing;
