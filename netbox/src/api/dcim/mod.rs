//! DCIM (data center infrastructure management) API

pub mod manufacturers;
pub mod ports;
pub mod templates;

use super::client::Client;
use super::collection::Endpoint;

pub use manufacturers::{Manufacturer, ManufacturerKind, ManufacturerListParams, WritableManufacturer};
pub use ports::{
    ConsolePort, ConsolePortKind, ConsolePortListParams, ConsoleServerPort, ConsoleServerPortKind,
    PowerOutlet, PowerOutletKind, PowerOutletListParams,
};
pub use templates::{
    ConsolePortTemplate, ConsolePortTemplateKind, ConsoleServerPortTemplateKind,
    PowerOutletTemplate, PowerOutletTemplateKind, PowerPortTemplate, PowerPortTemplateKind,
    WritableConsolePortTemplate, WritablePowerOutletTemplate, WritablePowerPortTemplate,
};

pub struct DcimApi<'a> {
    client: &'a Client,
}

impl<'a> DcimApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn console_ports(&self) -> Endpoint<'a, ConsolePortKind> {
        Endpoint::new(self.client)
    }

    pub fn console_server_ports(&self) -> Endpoint<'a, ConsoleServerPortKind> {
        Endpoint::new(self.client)
    }

    pub fn power_outlets(&self) -> Endpoint<'a, PowerOutletKind> {
        Endpoint::new(self.client)
    }

    pub fn manufacturers(&self) -> Endpoint<'a, ManufacturerKind> {
        Endpoint::new(self.client)
    }

    pub fn console_port_templates(&self) -> Endpoint<'a, ConsolePortTemplateKind> {
        Endpoint::new(self.client)
    }

    pub fn console_server_port_templates(&self) -> Endpoint<'a, ConsoleServerPortTemplateKind> {
        Endpoint::new(self.client)
    }

    pub fn power_port_templates(&self) -> Endpoint<'a, PowerPortTemplateKind> {
        Endpoint::new(self.client)
    }

    pub fn power_outlet_templates(&self) -> Endpoint<'a, PowerOutletTemplateKind> {
        Endpoint::new(self.client)
    }
}
