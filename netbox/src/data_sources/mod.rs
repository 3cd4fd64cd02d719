//! Data source implementations

pub mod manufacturer;
pub mod ports;

pub use manufacturer::ManufacturerDataSource;
pub use ports::{
    ConsolePortListing, ConsolePortsDataSource, ConsoleServerPortListing,
    ConsoleServerPortsDataSource, ListDataSource, Listing, PowerOutletListing,
    PowerOutletsDataSource,
};
