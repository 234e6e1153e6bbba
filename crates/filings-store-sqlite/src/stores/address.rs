//! Address rows. Not temporal themselves; offices and parties point at them
//! and are versioned instead.

use filings_core::filing::Address;
use rusqlite::{Connection, OptionalExtension as _, params};

use crate::Result;

pub fn insert(conn: &Connection, address: &Address) -> Result<i64> {
  conn.execute(
    "INSERT INTO address (
       street_address, street_address_additional, address_city,
       address_region, postal_code, address_country, delivery_instructions
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    params![
      address.street_address,
      address.street_address_additional,
      address.address_city,
      address.address_region,
      address.postal_code,
      address.address_country,
      address.delivery_instructions,
    ],
  )?;
  Ok(conn.last_insert_rowid())
}

pub fn insert_opt(conn: &Connection, address: Option<&Address>) -> Result<Option<i64>> {
  address.map(|a| insert(conn, a)).transpose()
}

pub fn load(conn: &Connection, addr_id: Option<i64>) -> Result<Option<Address>> {
  let Some(addr_id) = addr_id else {
    return Ok(None);
  };
  Ok(
    conn
      .query_row(
        "SELECT street_address, street_address_additional, address_city,
                address_region, postal_code, address_country,
                delivery_instructions
         FROM address WHERE addr_id = ?1",
        params![addr_id],
        |row| {
          Ok(Address {
            street_address:            row.get(0)?,
            street_address_additional: row.get(1)?,
            address_city:              row.get(2)?,
            address_region:            row.get(3)?,
            postal_code:               row.get(4)?,
            address_country:           row.get(5)?,
            delivery_instructions:     row.get(6)?,
          })
        },
      )
      .optional()?,
  )
}
