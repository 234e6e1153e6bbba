//! SQL schema for the filing ledger.
//!
//! Executed once at connection startup; `PRAGMA user_version` gates future
//! migrations.
//!
//! Every temporal table carries `start_event_id` and a nullable
//! `end_event_id`. Where a record's semantic key is not its row identity, a
//! partial unique index over `end_event_id IS NULL` rejects a second current
//! record for the same key.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Locked counter for non-cooperative event ids.
CREATE TABLE IF NOT EXISTS system_id (
    id_typ_cd TEXT PRIMARY KEY,
    id_num    INTEGER NOT NULL
);
INSERT OR IGNORE INTO system_id (id_typ_cd, id_num) VALUES ('EV', 100000000);

-- Cooperative event ids; starts at 1, far below the counter above.
CREATE TABLE IF NOT EXISTS noncorp_event_seq (
    event_id INTEGER PRIMARY KEY AUTOINCREMENT
);

CREATE TABLE IF NOT EXISTS corporation (
    corp_num           TEXT PRIMARY KEY,
    corp_typ_cd        TEXT NOT NULL,
    recognition_dts    TEXT NOT NULL,
    last_ar_filed_dt   TEXT,
    last_agm_date      TEXT,
    last_ledger_dt     TEXT,
    corp_frozen_typ_cd TEXT
);

-- Events are immutable once inserted.
CREATE TABLE IF NOT EXISTS event (
    event_id       INTEGER PRIMARY KEY,
    corp_num       TEXT NOT NULL REFERENCES corporation(corp_num),
    event_typ_cd   TEXT NOT NULL,   -- FILE | SYSDA | SYSDF | SYSDT
    event_timestmp TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS filing (
    event_id           INTEGER PRIMARY KEY REFERENCES event(event_id),
    filing_typ_cd      TEXT NOT NULL,
    effective_dt       TEXT NOT NULL,
    period_end_dt      TEXT,
    agm_date           TEXT,
    change_dt          TEXT,
    arrangement_ind    TEXT NOT NULL DEFAULT 'N',
    court_order_num    TEXT,
    ods_typ_cd         TEXT NOT NULL,
    corrected_event_id INTEGER REFERENCES event(event_id)
);

CREATE TABLE IF NOT EXISTS filing_user (
    event_id   INTEGER PRIMARY KEY REFERENCES event(event_id),
    user_id    TEXT NOT NULL,
    last_nme   TEXT,
    first_nme  TEXT,
    middle_nme TEXT,
    email_addr TEXT
);

CREATE TABLE IF NOT EXISTS ledger_text (
    ledger_text_id  INTEGER PRIMARY KEY,
    event_id        INTEGER NOT NULL REFERENCES event(event_id),
    ledger_text_dts TEXT NOT NULL,
    notation        TEXT,
    user_id         TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS address (
    addr_id                   INTEGER PRIMARY KEY,
    street_address            TEXT,
    street_address_additional TEXT,
    address_city              TEXT,
    address_region            TEXT,
    postal_code               TEXT,
    address_country           TEXT,
    delivery_instructions     TEXT
);

CREATE TABLE IF NOT EXISTS office (
    office_id        INTEGER PRIMARY KEY,
    corp_num         TEXT NOT NULL REFERENCES corporation(corp_num),
    office_typ_cd    TEXT NOT NULL,   -- RG | RC | LQ
    start_event_id   INTEGER NOT NULL REFERENCES event(event_id),
    end_event_id     INTEGER REFERENCES event(event_id),
    delivery_addr_id INTEGER REFERENCES address(addr_id),
    mailing_addr_id  INTEGER REFERENCES address(addr_id)
);
CREATE UNIQUE INDEX IF NOT EXISTS office_current_idx
    ON office(corp_num, office_typ_cd) WHERE end_event_id IS NULL;

-- One current legal name (CO or NB) per corporation; translations (TR) are
-- keyed by their text.
CREATE TABLE IF NOT EXISTS corp_name (
    corp_name_id     INTEGER PRIMARY KEY,
    corp_num         TEXT NOT NULL REFERENCES corporation(corp_num),
    corp_name_typ_cd TEXT NOT NULL,   -- CO | NB | TR
    corp_name        TEXT NOT NULL,
    start_event_id   INTEGER NOT NULL REFERENCES event(event_id),
    end_event_id     INTEGER REFERENCES event(event_id)
);
CREATE UNIQUE INDEX IF NOT EXISTS corp_name_current_idx
    ON corp_name(
        corp_num,
        (CASE WHEN corp_name_typ_cd = 'TR' THEN 'TR:' || corp_name ELSE 'LEGAL' END)
    ) WHERE end_event_id IS NULL;

-- Parties are keyed by row identity; directors are matched by name.
CREATE TABLE IF NOT EXISTS corp_party (
    corp_party_id    INTEGER PRIMARY KEY,
    corp_num         TEXT NOT NULL REFERENCES corporation(corp_num),
    party_typ_cd     TEXT NOT NULL,   -- role code: DIR | INC | CPRTY | ...
    start_event_id   INTEGER NOT NULL REFERENCES event(event_id),
    end_event_id     INTEGER REFERENCES event(event_id),
    prev_party_id    INTEGER REFERENCES corp_party(corp_party_id),
    appointment_dt   TEXT,
    cessation_dt     TEXT,
    first_nme        TEXT,
    middle_nme       TEXT,
    last_nme         TEXT,
    business_nme     TEXT,
    party_kind       TEXT NOT NULL DEFAULT 'person',
    email_address    TEXT,
    delivery_addr_id INTEGER REFERENCES address(addr_id),
    mailing_addr_id  INTEGER REFERENCES address(addr_id)
);
CREATE INDEX IF NOT EXISTS corp_party_corp_idx ON corp_party(corp_num, party_typ_cd);

CREATE TABLE IF NOT EXISTS share_struct (
    share_structure_id INTEGER PRIMARY KEY,
    corp_num           TEXT NOT NULL REFERENCES corporation(corp_num),
    start_event_id     INTEGER NOT NULL REFERENCES event(event_id),
    end_event_id       INTEGER REFERENCES event(event_id)
);
CREATE UNIQUE INDEX IF NOT EXISTS share_struct_current_idx
    ON share_struct(corp_num) WHERE end_event_id IS NULL;

CREATE TABLE IF NOT EXISTS share_struct_cls (
    share_class_id     INTEGER PRIMARY KEY,
    share_structure_id INTEGER NOT NULL REFERENCES share_struct(share_structure_id),
    seq_num            INTEGER NOT NULL,
    class_nme          TEXT NOT NULL,
    priority           INTEGER,
    max_share_ind      TEXT NOT NULL,
    share_quantity     INTEGER,
    par_value_ind      TEXT NOT NULL,
    par_value_amt      REAL,
    currency_typ_cd    TEXT,
    spec_rights_ind    TEXT NOT NULL,
    series_json        TEXT NOT NULL DEFAULT '[]'
);

-- Share structure resolution dates; append-only.
CREATE TABLE IF NOT EXISTS resolution (
    resolution_id  INTEGER PRIMARY KEY,
    corp_num       TEXT NOT NULL REFERENCES corporation(corp_num),
    start_event_id INTEGER NOT NULL REFERENCES event(event_id),
    end_event_id   INTEGER REFERENCES event(event_id),
    resolution_dt  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS jurisdiction (
    jurisdiction_id  INTEGER PRIMARY KEY,
    corp_num         TEXT NOT NULL REFERENCES corporation(corp_num),
    start_event_id   INTEGER NOT NULL REFERENCES event(event_id),
    end_event_id     INTEGER REFERENCES event(event_id),
    can_jur_typ_cd   TEXT NOT NULL,   -- FD | OT | two-letter region
    othr_juris_desc  TEXT,
    home_recogn_dt   TEXT,
    home_juris_num   TEXT,
    home_company_nme TEXT,
    bc_xpro_num      TEXT
);
CREATE UNIQUE INDEX IF NOT EXISTS jurisdiction_current_idx
    ON jurisdiction(corp_num) WHERE end_event_id IS NULL;

-- Businesses involved in an amalgamation, keyed by the resulting
-- corporation, the amalgamation event and position.
CREATE TABLE IF NOT EXISTS corp_involved (
    ted_corp_num     TEXT NOT NULL REFERENCES corporation(corp_num),
    start_event_id   INTEGER NOT NULL REFERENCES event(event_id),
    corp_involve_id  INTEGER NOT NULL,
    end_event_id     INTEGER REFERENCES event(event_id),
    corp_num         TEXT,
    adopted_corp_ind TEXT NOT NULL DEFAULT 'N',
    can_jur_typ_cd   TEXT,
    othr_juri_desc   TEXT,
    home_juri_num    TEXT,
    foreign_nme      TEXT,
    PRIMARY KEY (ted_corp_num, start_event_id, corp_involve_id)
);

CREATE TABLE IF NOT EXISTS corp_restriction (
    corp_restriction_id INTEGER PRIMARY KEY,
    corp_num            TEXT NOT NULL REFERENCES corporation(corp_num),
    start_event_id      INTEGER NOT NULL REFERENCES event(event_id),
    end_event_id        INTEGER REFERENCES event(event_id),
    restriction_ind     TEXT NOT NULL   -- Y | N
);
CREATE UNIQUE INDEX IF NOT EXISTS corp_restriction_current_idx
    ON corp_restriction(corp_num) WHERE end_event_id IS NULL;

CREATE TABLE IF NOT EXISTS corp_state (
    corp_state_id  INTEGER PRIMARY KEY,
    corp_num       TEXT NOT NULL REFERENCES corporation(corp_num),
    start_event_id INTEGER NOT NULL REFERENCES event(event_id),
    end_event_id   INTEGER REFERENCES event(event_id),
    state_typ_cd   TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS corp_state_current_idx
    ON corp_state(corp_num) WHERE end_event_id IS NULL;

CREATE INDEX IF NOT EXISTS event_corp_idx ON event(corp_num, event_timestmp);
CREATE INDEX IF NOT EXISTS filing_code_idx ON filing(filing_typ_cd);

PRAGMA user_version = 1;
";
