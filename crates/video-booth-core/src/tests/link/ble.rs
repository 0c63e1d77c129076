use crate::link::{PeripheralIds, ble::command_characteristic};

use std::collections::BTreeSet;

use btleplug::api::{CharPropFlags, Characteristic};
use uuid::Uuid;

const OTHER_SERVICE: Uuid = Uuid::from_u128(0x0000ffe0_0000_1000_8000_00805f9b34fb);

fn characteristic(service_uuid: Uuid, uuid: Uuid) -> Characteristic {
    Characteristic {
        uuid,
        service_uuid,
        properties: CharPropFlags::WRITE_WITHOUT_RESPONSE,
        descriptors: BTreeSet::new(),
    }
}

/// WHAT: The command characteristic is matched within the command service only
/// WHY: Modules expose the same characteristic UUID under other services
#[test]
fn given_same_uuid_in_two_services_when_selecting_then_command_service_chosen() {
    // Given: FFE1 under an unrelated service listed first
    let ids = PeripheralIds::default();
    let decoy = characteristic(OTHER_SERVICE, ids.characteristic);
    let target = characteristic(ids.service, ids.characteristic);

    // When: Selecting
    let chosen = command_characteristic([decoy, target.clone()], ids);

    // Then: The one in the command service
    assert_eq!(chosen, Some(target));
}

/// WHAT: A characteristic outside the command service is not used
/// WHY: Writing to the wrong service would send the command nowhere
#[test]
fn given_uuid_only_in_other_service_when_selecting_then_none() {
    let ids = PeripheralIds::default();

    let chosen = command_characteristic([characteristic(OTHER_SERVICE, ids.characteristic)], ids);

    assert_eq!(chosen, None);
}
