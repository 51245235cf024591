//! Violation code and description resolution.
//!
//! The Department of Finance has reused codes and description strings for
//! different violations over the years, so every definition carries the
//! date it took effect. A lookup picks, among the definitions matching a
//! code (fiscal-year tables) or a raw description (OPACV), the one with
//! the latest effective date on or before the violation's local date.

use chrono::{NaiveDate, NaiveDateTime};
use plate_lookup_violation_models::descriptions::{
    BUS_LANE_CAMERA, MOBILE_BUS_LANE_CAMERA, NO_STANDING_SNOW_EMERGENCY, RED_LIGHT_CAMERA,
    SCHOOL_ZONE_SPEED_CAMERA,
};

use crate::NormalizeError;

/// A resolved violation definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDescription {
    /// Department of Finance violation code.
    pub code: &'static str,
    /// Readable description.
    pub humanized: &'static str,
}

struct Definition {
    code: &'static str,
    /// `(year, month, day)` the definition took effect.
    effective: (i32, u32, u32),
    /// Description text as printed in the OPACV table.
    raw: &'static str,
    humanized: &'static str,
}

const EPOCH: (i32, u32, u32) = (1970, 1, 1);

/// Mobile bus lane cameras took over code 12.
const MOBILE_BUS_LANE_CUTOVER: (i32, u32, u32) = (2019, 12, 6);

const fn def(code: &'static str, raw: &'static str, humanized: &'static str) -> Definition {
    Definition {
        code,
        effective: EPOCH,
        raw,
        humanized,
    }
}

const fn def_from(
    code: &'static str,
    effective: (i32, u32, u32),
    raw: &'static str,
    humanized: &'static str,
) -> Definition {
    Definition {
        code,
        effective,
        raw,
        humanized,
    }
}

#[rustfmt::skip]
static DEFINITIONS: &[Definition] = &[
    def("1", "FAILURE TO DISPLAY BUS PERMIT", "Failure to Display Bus Permit"),
    def("2", "NO OPERATOR NAM/ADD/PH DISPLAY", "No Operator Name, Address or Phone Displayed"),
    def("3", "UNAUTHORIZED PASSENGER PICK-UP", "Unauthorized Passenger Pick-Up"),
    def("4", "BUS PARKING IN LOWER MANHATTAN", "Bus Parking in Lower Manhattan"),
    def("5", "BUS LANE VIOLATION", BUS_LANE_CAMERA),
    def("6", "OVERNIGHT TRACTOR TRAILER PKG", "Overnight Parking of Tractor Trailer"),
    def("7", "FAILURE TO STOP AT RED LIGHT", RED_LIGHT_CAMERA),
    def("8", "IDLING", "Idling"),
    def("9", "OBSTRUCTING TRAFFIC/INTERSECT", "Obstructing Traffic or Intersection"),
    def("10", "NO STOPPING-DAY/TIME LIMITS", "No Stopping - Day/Time Limits"),
    def("11", "NO STANDING-HOTEL LOADING", "No Standing - Hotel Loading"),
    def("12", "NO STANDING-SNOW EMERGENCY", NO_STANDING_SNOW_EMERGENCY),
    def_from("12", MOBILE_BUS_LANE_CUTOVER, "MOBILE BUS LANE VIOLATION", MOBILE_BUS_LANE_CAMERA),
    def("13", "NO STANDING-TAXI STAND", "No Standing - Taxi Stand"),
    def("14", "NO STANDING-DAY/TIME LIMITS", "No Standing - Day/Time Limits"),
    def("15", "NO STANDING-OFF-STREET LOT", "No Standing - Off-Street Lot"),
    def("16", "NO STANDING-EXC. TRUCK LOADING", "No Standing - Except Truck Loading/Unloading"),
    def("17", "NO PARKING-EXC. AUTH. VEHICLE", "No Parking - Except Authorized Vehicles"),
    def("18", "NO STANDING-BUS LANE", "No Standing - Bus Lane"),
    def("19", "NO STANDING-BUS STOP", "No Standing - Bus Stop"),
    def("20", "NO PARKING-DAY/TIME LIMITS", "No Parking - Day/Time Limits"),
    def("21", "NO PARKING-STREET CLEANING", "No Parking - Street Cleaning"),
    def("22", "NO PARKING-EXC. HOTEL LOADING", "No Parking - Except Hotel Loading"),
    def("23", "NO PARKING-TAXI STAND", "No Parking - Taxi Stand"),
    def("24", "NO PARKING-EXC. AUTH. VEHICLE", "No Parking - Except Authorized Vehicles"),
    def("25", "NO STANDING-COMMUTER VAN STOP", "No Standing - Commuter Van Stop"),
    def("26", "NO STANDING-FOR HIRE VEH STOP", "No Standing - For Hire Vehicle Stop"),
    def("27", "NO PARKING-EXC. DSBLTY PERMIT", "No Parking - Except Disability Permit"),
    def("28", "OVERTIME STANDING DP", "Overtime Standing - Diplomat"),
    def("29", "ALTERING INTERCITY BUS PERMIT", "Altering Intercity Bus Permit"),
    def("30", "NO STOP/STANDNG EXCEPT PAS P/U", "No Stopping/Standing - Except Passenger Pick-Up"),
    def("31", "NO STANDING-COMM METER ZONE", "No Standing - Commercial Meter Zone"),
    def("32", "OT PARKING-MISSING/BROKEN METR", "Overtime Parking at Missing or Broken Meter"),
    def("33", "FEEDING METER", "Feeding Meter"),
    def("34", "EXPIRED METER", "Expired Meter"),
    def("35", "SELLING/OFFERING MCHNDSE-METER", "Selling or Offering Merchandise From Metered Space"),
    def("36", "PHTO SCHOOL ZN SPEED VIOLATION", SCHOOL_ZONE_SPEED_CAMERA),
    def("37", "EXPIRED MUNI METER", "Expired Muni Meter"),
    def("38", "FAIL TO DSPLY MUNI METER RECPT", "Failure to Display Muni Meter Receipt"),
    def("39", "OVERTIME PKG-TIME LIMIT POSTED", "Overtime Parking - Time Limit Posted"),
    def("40", "FIRE HYDRANT", "Fire Hydrant"),
    def("41", "MISCELLANEOUS", "Miscellaneous"),
    def("42", "EXPIRED MUNI MTR-COMM MTR ZN", "Expired Muni Meter - Commercial Meter Zone"),
    def("43", "EXPIRED METER-COMM METER ZONE", "Expired Meter - Commercial Meter Zone"),
    def("44", "OVERTIME PKG-COMM METER ZONE", "Overtime Parking - Commercial Meter Zone"),
    def("45", "TRAFFIC LANE", "Traffic Lane"),
    def("46", "DOUBLE PARKING", "Double Parking"),
    def("47", "DOUBLE PARKING-MIDTOWN COMML", "Double Parking - Midtown Commercial"),
    def("48", "BIKE LANE", "Bike Lane"),
    def("49", "EXCAVATION-VEHICLE OBSTR TRAFF", "Excavation - Vehicle Obstructing Traffic"),
    def("50", "CROSSWALK", "Crosswalk"),
    def("51", "SIDEWALK", "Sidewalk"),
    def("52", "INTERSECTION", "Intersection"),
    def("53", "SAFETY ZONE", "Safety Zone"),
    def("55", "TUNNEL/ELEVATED/ROADWAY", "Tunnel, Elevated or Roadway"),
    def("56", "DIVIDED HIGHWAY", "Divided Highway"),
    def("57", "BLUE ZONE", "Blue Zone"),
    def("58", "MARGINAL STREET/WATER FRONT", "Marginal Street or Waterfront"),
    def("59", "ANGLE PARKING-COMM VEHICLE", "Angle Parking - Commercial Vehicle"),
    def("60", "ANGLE PARKING", "Angle Parking"),
    def("61", "WRONG WAY", "Wrong Way"),
    def("62", "BEYOND MARKED SPACE", "Beyond Marked Space"),
    def("63", "NIGHTTIME STD/ PKG IN A PARK", "Nighttime Standing or Parking in a Park"),
    def("64", "NO STANDING EXCP D/S", "No Standing - Except Diplomat"),
    def("65", "OT STD,PL/CONSUL VEH", "Overtime Standing - Consular Vehicle"),
    def("66", "DETACHED TRAILER", "Detached Trailer"),
    def("67", "PEDESTRIAN RAMP", "Pedestrian Ramp"),
    def("68", "NON-COMPLIANCE W/ POSTED SIGN", "Non-Compliance With Posted Sign"),
    def("69", "FAIL TO DISP. MUNI METER RECPT", "Failure to Display Muni Meter Receipt"),
    def("70", "REG. STICKER-EXPIRED/MISSING", "Registration Sticker Expired or Missing"),
    def("71", "INSP. STICKER-EXPIRED/MISSING", "Inspection Sticker Expired or Missing"),
    def("72", "INSP STICKER-MUTILATED/C'FEIT", "Inspection Sticker Mutilated or Counterfeit"),
    def("73", "REG STICKER-MUTILATED/C'FEIT", "Registration Sticker Mutilated or Counterfeit"),
    def("74", "FRONT OR BACK PLATE MISSING", "Front or Back Plate Missing"),
    def("75", "NO MATCH-PLATE/STICKER", "Plate and Sticker Do Not Match"),
    def("77", "PARKED BUS-EXC. DESIG. AREA", "Parked Bus - Except Designated Area"),
    def("78", "NGHT PKG ON RESID STR-COMM VEH", "Nighttime Parking on Residential Street - Commercial Vehicle"),
    def("79", "UNALTERED COMM VEHICLE", "Unaltered Commercial Vehicle"),
    def("80", "MISSING EQUIPMENT", "Missing Equipment"),
    def("81", "NO STANDING EXCP DP", "No Standing - Except Diplomat"),
    def("82", "COMML PLATES-UNALTERED VEHICLE", "Commercial Plates on Unaltered Vehicle"),
    def("83", "IMPROPER REGISTRATION", "Improper Registration"),
    def("84", "PLTFRM LFTS LWRD POS COMM VEH", "Platform Lifts in Lowered Position - Commercial Vehicle"),
    def("85", "STORAGE-3HR COMMERCIAL", "Storage - 3 Hour Commercial"),
    def("86", "MIDTOWN PKG OR STD-3HR LIMIT", "Midtown Parking or Standing - 3 Hour Limit"),
    def("89", "NO STANDING-COMM VEH ONLY ZONE", "No Standing - Commercial Vehicles Only Zone"),
    def("91", "VEHICLE FOR SALE(DEALERS ONLY)", "Vehicle for Sale (Dealers Only)"),
    def("92", "WASH/REPAIR VEHCL-REPAIR ONLY", "Washing or Repairing Vehicle"),
    def("93", "REMOVE/REPLACE FLAT TIRE", "Removing or Replacing Flat Tire"),
    def("96", "RAILROAD CROSSING", "Railroad Crossing"),
    def("98", "OBSTRUCTING DRIVEWAY", "Obstructing Driveway"),
    def("99", "OTHER", "Other"),
];

/// Resolves a fiscal-year violation code at the given local time.
///
/// Returns `Ok(None)` for codes the table does not know.
///
/// # Errors
///
/// Returns [`NormalizeError::UnrecognizedTimePeriod`] if the code is known
/// but no definition was in effect at `at`, or if the code has several
/// definitions and `at` is unknown.
pub fn resolve_code(
    code: &str,
    at: Option<NaiveDateTime>,
) -> Result<Option<ResolvedDescription>, NormalizeError> {
    let key = normalize_code(code);
    resolve(&key, at, |def| def.code == key)
}

/// Resolves an OPACV raw description at the given local time.
///
/// Returns `Ok(None)` for descriptions the table does not know.
///
/// # Errors
///
/// Same as [`resolve_code`].
pub fn resolve_raw_description(
    raw: &str,
    at: Option<NaiveDateTime>,
) -> Result<Option<ResolvedDescription>, NormalizeError> {
    let key = normalize_raw(raw);
    resolve(&key, at, |def| def.raw == key)
}

fn resolve(
    key: &str,
    at: Option<NaiveDateTime>,
    matches: impl Fn(&Definition) -> bool,
) -> Result<Option<ResolvedDescription>, NormalizeError> {
    // Definitions sharing an effective date are interchangeable; the first
    // listed wins.
    let mut candidates: Vec<&Definition> = Vec::new();
    for def in DEFINITIONS.iter().filter(|def| matches(def)) {
        if !candidates.iter().any(|kept| kept.effective == def.effective) {
            candidates.push(def);
        }
    }
    if candidates.is_empty() {
        log::debug!("no definition for violation {key:?}");
        return Ok(None);
    }

    let unrecognized = || NormalizeError::UnrecognizedTimePeriod {
        code: key.to_string(),
    };

    let chosen = match (at, candidates.as_slice()) {
        (None, [only]) => *only,
        (None, _) => return Err(unrecognized()),
        (Some(at), _) => candidates
            .iter()
            .filter_map(|def| effective_date(def).map(|date| (date, *def)))
            .filter(|(date, _)| *date <= at.date())
            .max_by_key(|(date, _)| *date)
            .map(|(_, def)| def)
            .ok_or_else(unrecognized)?,
    };

    Ok(Some(ResolvedDescription {
        code: chosen.code,
        humanized: chosen.humanized,
    }))
}

fn effective_date(def: &Definition) -> Option<NaiveDate> {
    let (y, m, d) = def.effective;
    NaiveDate::from_ymd_opt(y, m, d)
}

/// `"021"` and `" 21"` both mean code 21.
fn normalize_code(code: &str) -> String {
    let trimmed = code.trim().trim_start_matches('0');
    if trimmed.is_empty() && !code.trim().is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn normalize_raw(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase()
}
