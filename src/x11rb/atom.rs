//! Batch atom interning: send every `InternAtom` request up front, then
//! collect the replies in a single pass rather than round-tripping once
//! per atom.

use std::collections::HashMap;

use strum::IntoEnumIterator;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::ConnectionExt;

use crate::x::Atom;

use super::Result;

#[derive(Debug)]
pub(crate) struct Atoms {
    known: HashMap<Atom, u32>,
    by_value: HashMap<u32, Atom>,
}

impl Atoms {
    pub(crate) fn new(conn: &impl Connection) -> Result<Self> {
        let requests = Atom::iter()
            .map(|atom| Ok((atom, conn.intern_atom(false, atom.as_ref().as_bytes())?)))
            .collect::<Result<Vec<_>>>()?;

        let known = requests
            .into_iter()
            .map(|(atom, cookie)| Ok((atom, cookie.reply()?.atom)))
            .collect::<Result<HashMap<_, _>>>()?;
        let by_value = known.iter().map(|(atom, value)| (*value, *atom)).collect();

        Ok(Self { known, by_value })
    }

    pub(crate) fn id(&self, atom: Atom) -> u32 {
        *self.known.get(&atom).expect("every Atom variant is interned at startup")
    }

    pub(crate) fn name(&self, id: u32) -> Option<Atom> {
        self.by_value.get(&id).copied()
    }
}
