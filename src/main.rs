use serialport::{SerialPortType, available_ports};
use tracing::info;
use tracing_subscriber;

fn main() {
    // Initialize tracing (optional, but good for debugging)
    tracing_subscriber::fmt::init();

    info!("Listing serial ports...\n");

    match available_ports() {
        Ok(ports) => {
            let mut count = 0;
            for port in ports {
                count += 1;
                info!("Port #{}: {}", count, port.port_name);
                match port.port_type {
                    SerialPortType::UsbPort(usb) => {
                        info!("  Type: USB, VID: {:#06x}, PID: {:#06x}", usb.vid, usb.pid);
                        if let Some(manufacturer) = usb.manufacturer {
                            info!("  Manufacturer: {}", manufacturer);
                        } else {
                            info!("  Manufacturer: <Not available>");
                        }
                        if let Some(product) = usb.product {
                            info!("  Product: {}", product);
                        } else {
                            info!("  Product: <Not available>");
                        }
                        if let Some(serial) = usb.serial_number {
                            info!("  Serial: {}", serial);
                        } else {
                            info!("  Serial: <Not available>");
                        }
                    }
                    SerialPortType::BluetoothPort => info!("  Type: Bluetooth"),
                    SerialPortType::PciPort => info!("  Type: PCI"),
                    SerialPortType::Unknown => info!("  Type: <Unknown>"),
                }
                info!("---");
            }
            if count == 0 {
                info!("No serial ports found.");
            }
        }
        Err(e) => {
            eprintln!("Error listing serial ports: {:?}", e);
        }
    }
}
