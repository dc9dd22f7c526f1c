//! Demo administrative catalog, used by the CLI binary on first run and
//! by tests. Real deployments load the catalog from the backend service.

use crate::directory::AdministrativeUnit;

/// A small two-region hierarchy.
///
/// Deliberately includes an "East" sub-region under both regions: names
/// repeat across parents, which is exactly why lookups are parent-scoped.
pub fn demo_units() -> Vec<AdministrativeUnit> {
    let mut units = Vec::new();

    let central = AdministrativeUnit::root("Central");
    let highlands = AdministrativeUnit::root("Highlands");

    let central_east = AdministrativeUnit::child_of(&central, "East");
    let central_west = AdministrativeUnit::child_of(&central, "West");
    let highlands_east = AdministrativeUnit::child_of(&highlands, "East");
    let highlands_north = AdministrativeUnit::child_of(&highlands, "North");

    let kup = AdministrativeUnit::child_of(&central_east, "Kup");
    let tella = AdministrativeUnit::child_of(&central_east, "Tella");
    let doma = AdministrativeUnit::child_of(&central_west, "Doma");
    let gumine = AdministrativeUnit::child_of(&highlands_east, "Gumine");
    let kerowagi = AdministrativeUnit::child_of(&highlands_north, "Kerowagi");

    for lga in [&kup, &tella, &doma, &gumine, &kerowagi] {
        for n in 1..=3 {
            units.push(AdministrativeUnit::child_of(lga, format!("Ward{n}")));
        }
    }

    units.extend([
        central,
        highlands,
        central_east,
        central_west,
        highlands_east,
        highlands_north,
        kup,
        tella,
        doma,
        gumine,
        kerowagi,
    ]);
    units
}
