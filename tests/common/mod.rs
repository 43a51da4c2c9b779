#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub const HEADER: &str = "CRASH_DATE,CRASH_TIME,BOROUGH,LATITUDE,LONGITUDE,ON_STREET_NAME,\
INJURED_PERSONS,INJURED_PEDESTRIANS,INJURED_CYCLISTS,INJURED_MOTORISTS";

/// Five collisions; the third has no longitude, the fifth no street or person count.
pub const SAMPLE_ROWS: [&str; 5] = [
    "09/11/2021,2:39,BROOKLYN,40.667202,-73.8665,WHITESTONE EXPRESSWAY,2,0,0,2",
    "03/26/2022,11:45,MANHATTAN,40.7128,-74.006,BROADWAY,1,1,0,0",
    "06/29/2022,5:10,QUEENS,40.7282,,3 AVENUE,0,0,0,0",
    "09/11/2021,5:10,BRONX,40.8448,-73.8648,GRAND CONCOURSE,3,0,3,0",
    "12/14/2021,5:45,BROOKLYN,40.6782,-73.9442,,,0,0,0",
];

pub fn write_csv(dir: &Path, name: &str, header: &str, rows: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut content = String::from(header);
    content.push('\n');
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    fs::write(&path, content).expect("write fixture csv");
    path
}

pub fn sample_csv(dir: &Path) -> PathBuf {
    write_csv(dir, "collisions.csv", HEADER, &SAMPLE_ROWS)
}
