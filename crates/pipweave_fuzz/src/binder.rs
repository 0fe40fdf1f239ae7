//! Site-pin to cell-pin binding.
//!
//! [`classify`] is the fixed catalog mapping a `(site type, pin, direction)`
//! to the BEL, primitive and primitive pin that would drive or sink the net
//! at that site pin. [`Binder`] holds the cells of one design and answers
//! whether a resolved pin can be used by a net ("query"), or records the
//! binding ("commit").
//!
//! Directions are from the site's point of view: a site [`PinDir::Input`] is
//! a net sink and a site [`PinDir::Output`] is a net driver.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use pipweave_common::Interner;
use pipweave_graph::{SitePin, TileKey};

use crate::error::BindError;
use crate::ids::{CellId, NetId};

/// Wire names with this prefix carry the constant-high net.
pub const CONSTANT_WIRE_PREFIX: &str = "VCC_WIRE";

/// Primitive used to drive constant-tied nets.
pub const CONSTANT_CELL_TYPE: &str = "VCC";

/// Output pin of [`CONSTANT_CELL_TYPE`].
pub const CONSTANT_CELL_PIN: &str = "P";

/// Direction of a site pin, seen from inside the site.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PinDir {
    /// Signal enters the site; the net ends here.
    Input,
    /// Signal leaves the site; the net starts here.
    Output,
}

/// Site types with a known pin mapping.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SiteType {
    /// CLB slice (LUTs and flip-flops).
    Slice,
    /// Horizontal clock row buffer.
    BufceRow,
    /// Leaf clock buffer.
    BufceLeaf,
    /// Global clock buffer with enable.
    Bufgce,
    /// Global clock buffer with divider.
    BufgceDiv,
    /// Global clock multiplexer.
    Bufgctrl,
    /// Transceiver clock buffer.
    BufgGt,
    /// Mixed-mode clock manager.
    Mmcm,
    /// Phase-locked loop.
    Pll,
    /// I/O buffer.
    Iob,
    /// Native-mode I/O bit slice.
    BitsliceRxTx,
    /// Processing system.
    Ps8,
}

impl SiteType {
    /// Maps a site name prefix (the site type) to its [`SiteType`].
    pub fn from_name(prefix: &str) -> Option<Self> {
        Some(match prefix {
            "SLICE" => Self::Slice,
            "BUFCE_ROW" => Self::BufceRow,
            "BUFCE_LEAF" => Self::BufceLeaf,
            "BUFGCE" => Self::Bufgce,
            "BUFGCE_DIV" => Self::BufgceDiv,
            "BUFGCTRL" => Self::Bufgctrl,
            "BUFG_GT" => Self::BufgGt,
            "MMCM" => Self::Mmcm,
            "PLL" => Self::Pll,
            "IOB" => Self::Iob,
            "BITSLICE_RX_TX" => Self::BitsliceRxTx,
            "PS8" => Self::Ps8,
            _ => return None,
        })
    }
}

/// The primitive pin a site pin resolves to.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BelPin {
    /// BEL within the site.
    pub bel: String,
    /// Primitive type placed on the BEL.
    pub cell_type: &'static str,
    /// Pin on the primitive.
    pub cell_pin: String,
    /// Whether this input may be tied to constant high instead of driven.
    pub tie_high: bool,
}

impl BelPin {
    fn new(bel: impl Into<String>, cell_type: &'static str, cell_pin: impl Into<String>) -> Self {
        Self {
            bel: bel.into(),
            cell_type,
            cell_pin: cell_pin.into(),
            tie_high: false,
        }
    }

    fn tied(mut self, tie_high: bool) -> Self {
        self.tie_high = tie_high;
        self
    }
}

/// `(site pin, direction, cell pin, tie_high)` rows for fixed-pin sites.
type PinTable = [(&'static str, PinDir, &'static str, bool)];

fn lookup(
    table: &PinTable,
    bel: &str,
    cell_type: &'static str,
    pin: &str,
    dir: PinDir,
) -> Option<BelPin> {
    table
        .iter()
        .find(|(name, d, _, _)| *name == pin && *d == dir)
        .map(|&(_, _, cell_pin, tie)| BelPin::new(bel, cell_type, cell_pin).tied(tie))
}

/// Maps a site pin to its primitive pin, or `None` if the pin is unmapped.
pub fn classify(site_type: SiteType, pin: &str, dir: PinDir) -> Option<BelPin> {
    use PinDir::{Input, Output};
    match site_type {
        SiteType::Slice => slice_pin(pin, dir),
        SiteType::BufceRow | SiteType::BufceLeaf => {
            let cell_type = if site_type == SiteType::BufceRow {
                "BUFCE_ROW"
            } else {
                "BUFCE_LEAF"
            };
            const TABLE: &PinTable = &[
                ("CLK_IN", PinDir::Input, "I", false),
                ("CE_INT", PinDir::Input, "CE", true),
                ("CLK_OUT", PinDir::Output, "O", false),
            ];
            lookup(TABLE, "BUFCE", cell_type, pin, dir)
        }
        SiteType::Bufgce => {
            const TABLE: &PinTable = &[
                ("CLK_IN", PinDir::Input, "I", false),
                ("CE_PRE_OPTINV", PinDir::Input, "CE", true),
                ("CLK_OUT", PinDir::Output, "O", false),
            ];
            lookup(TABLE, "BUFCE", "BUFGCE", pin, dir)
        }
        SiteType::BufgceDiv => {
            const TABLE: &PinTable = &[
                ("CLK_IN", PinDir::Input, "I", false),
                ("CE_PRE_OPTINV", PinDir::Input, "CE", true),
                ("CLR", PinDir::Input, "CLR", false),
                ("CLK_OUT", PinDir::Output, "O", false),
            ];
            lookup(TABLE, "BUFGCE_DIV", "BUFGCE_DIV", pin, dir)
        }
        SiteType::Bufgctrl => {
            const TABLE: &PinTable = &[
                ("CLK_I0", PinDir::Input, "I0", false),
                ("CLK_I1", PinDir::Input, "I1", false),
                ("CE0_PRE_OPTINV", PinDir::Input, "CE0", true),
                ("CE1_PRE_OPTINV", PinDir::Input, "CE1", true),
                ("S0", PinDir::Input, "S0", false),
                ("S1", PinDir::Input, "S1", false),
                ("CLK_OUT", PinDir::Output, "O", false),
            ];
            lookup(TABLE, "BUFGCTRL", "BUFGCTRL", pin, dir)
        }
        SiteType::BufgGt => {
            const TABLE: &PinTable = &[
                ("CLK_IN", PinDir::Input, "I", false),
                ("CLK_OUT", PinDir::Output, "O", false),
            ];
            lookup(TABLE, "BUFG_GT", "BUFG_GT", pin, dir)
        }
        SiteType::Mmcm => {
            let known = match dir {
                Input => matches!(pin, "CLKIN1" | "CLKIN2" | "CLKFBIN"),
                Output => matches!(
                    pin,
                    "CLKOUT0"
                        | "CLKOUT1"
                        | "CLKOUT2"
                        | "CLKOUT3"
                        | "CLKOUT4"
                        | "CLKOUT5"
                        | "CLKOUT6"
                        | "CLKOUT0B"
                        | "CLKOUT1B"
                        | "CLKOUT2B"
                        | "CLKOUT3B"
                        | "CLKFBOUT"
                        | "CLKFBOUTB"
                ),
            };
            known.then(|| BelPin::new("MMCM", "MMCME4_ADV", pin))
        }
        SiteType::Pll => {
            let known = match dir {
                Input => matches!(pin, "CLKIN" | "CLKFBIN"),
                Output => matches!(
                    pin,
                    "CLKOUT0" | "CLKOUT0B" | "CLKOUT1" | "CLKOUT1B" | "CLKFBOUT" | "CLKOUTPHY"
                ),
            };
            known.then(|| BelPin::new("PLL", "PLLE4_ADV", pin))
        }
        SiteType::Iob => match (pin, dir) {
            ("I", Output) => Some(BelPin::new("INBUF", "IBUF", "O")),
            ("O", Input) => Some(BelPin::new("OUTBUF", "OBUF", "I")),
            _ => None,
        },
        SiteType::BitsliceRxTx => {
            let (prefix, bus) = match dir {
                Output => ("RX_Q", "Q"),
                Input => ("TX_D", "D"),
            };
            let bit = indexed(pin, prefix, 0..=7)?;
            Some(BelPin::new("RXTX_BITSLICE", "RXTX_BITSLICE", format!("{bus}[{bit}]")))
        }
        SiteType::Ps8 => ps8_pin(pin, dir),
    }
}

/// Parses `<prefix><n>` with `n` in `range`.
fn indexed(pin: &str, prefix: &str, range: std::ops::RangeInclusive<u8>) -> Option<u8> {
    let n: u8 = pin.strip_prefix(prefix)?.parse().ok()?;
    range.contains(&n).then_some(n)
}

fn slice_pin(pin: &str, dir: PinDir) -> Option<BelPin> {
    let mut chars = pin.chars();
    let letter = chars.next().filter(|c| ('A'..='H').contains(c))?;
    let rest = chars.as_str();
    match dir {
        PinDir::Input => {
            let n = indexed(rest, "", 1..=6)?;
            Some(BelPin::new(format!("{letter}6LUT"), "LUT6", format!("I{}", n - 1)))
        }
        PinDir::Output => match rest {
            "_O" => Some(BelPin::new(format!("{letter}6LUT"), "LUT6", "O")),
            "Q" => Some(BelPin::new(format!("{letter}FF"), "FDRE", "Q")),
            "Q2" => Some(BelPin::new(format!("{letter}FF2"), "FDRE", "Q")),
            _ => None,
        },
    }
}

fn ps8_pin(pin: &str, dir: PinDir) -> Option<BelPin> {
    let cell_pin = match dir {
        PinDir::Output => format!("pl_clk{}", indexed(pin, "PLCLK", 0..=3)?),
        PinDir::Input => match pin {
            "MAXIGP0ACLK" => "maxihpm0_fpd_aclk".to_string(),
            "MAXIGP1ACLK" => "maxihpm1_fpd_aclk".to_string(),
            "MAXIGP2ACLK" => "maxihpm0_lpd_aclk".to_string(),
            _ => return None,
        },
    };
    Some(BelPin::new("PS8", "PS8", cell_pin))
}

/// Resolves a graph site pin through the catalog.
pub fn classify_site_pin(pin: &SitePin, dir: PinDir, interner: &Interner) -> Option<BelPin> {
    let site_type = SiteType::from_name(interner.resolve(pin.site.prefix))?;
    classify(site_type, interner.resolve(pin.pin), dir)
}

/// Returns `true` if the wire name marks a constant-high source.
pub fn is_constant_source(wire_name: &str) -> bool {
    wire_name.starts_with(CONSTANT_WIRE_PREFIX)
}

/// A primitive instance in a design.
#[derive(Clone, Debug)]
pub struct Cell {
    /// Primitive type.
    pub cell_type: &'static str,
    /// `(site, bel)`; `None` for synthetic cells left to the tool to place.
    pub placement: Option<(TileKey, String)>,
    /// Bound primitive pins.
    pub pins: BTreeMap<String, NetId>,
}

/// Cells and site bookkeeping for one design.
#[derive(Debug, Default)]
pub struct Binder {
    cells: Vec<Cell>,
    by_bel: HashMap<(TileKey, String), CellId>,
    used_sites: BTreeSet<TileKey>,
    routethru_sites: BTreeSet<TileKey>,
}

impl Binder {
    /// Creates an empty binder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Query mode: whether `net` may use `bel_pin` at `site`.
    ///
    /// A pin held by another net only blocks if that net is finalized.
    pub fn is_available(
        &self,
        site: TileKey,
        bel_pin: &BelPin,
        net: NetId,
        is_finalized: impl Fn(NetId) -> bool,
    ) -> bool {
        self.check(site, bel_pin, net, is_finalized).is_ok()
    }

    fn check(
        &self,
        site: TileKey,
        bel_pin: &BelPin,
        net: NetId,
        is_finalized: impl Fn(NetId) -> bool,
    ) -> Result<(), BindError> {
        if self.is_routethru(site) {
            return Err(BindError::Routethru);
        }
        let Some(&cell) = self.by_bel.get(&(site, bel_pin.bel.clone())) else {
            return Ok(());
        };
        match self.cells[cell.as_raw() as usize].pins.get(&bel_pin.cell_pin) {
            Some(&existing) if existing != net && is_finalized(existing) => {
                Err(BindError::Conflict {
                    cell,
                    pin: bel_pin.cell_pin.clone(),
                    existing,
                })
            }
            _ => Ok(()),
        }
    }

    /// Commit mode: binds `bel_pin` at `site` to `net`, creating the cell on
    /// first use.
    ///
    /// # Errors
    ///
    /// Fails without side effects if the site is a routethru or the pin
    /// belongs to another finalized net.
    pub fn bind(
        &mut self,
        site: TileKey,
        bel_pin: &BelPin,
        net: NetId,
        is_finalized: impl Fn(NetId) -> bool,
    ) -> Result<CellId, BindError> {
        self.check(site, bel_pin, net, is_finalized)?;
        let key = (site, bel_pin.bel.clone());
        let cell = match self.by_bel.get(&key) {
            Some(&cell) => cell,
            None => {
                let cell = self.push_cell(bel_pin.cell_type, Some(key.clone()));
                self.by_bel.insert(key, cell);
                cell
            }
        };
        self.cells[cell.as_raw() as usize]
            .pins
            .insert(bel_pin.cell_pin.clone(), net);
        self.used_sites.insert(site);
        Ok(cell)
    }

    /// Creates a constant-high driver cell for `net`.
    pub fn bind_constant(&mut self, net: NetId) -> CellId {
        let cell = self.push_cell(CONSTANT_CELL_TYPE, None);
        self.cells[cell.as_raw() as usize]
            .pins
            .insert(CONSTANT_CELL_PIN.to_string(), net);
        cell
    }

    fn push_cell(&mut self, cell_type: &'static str, placement: Option<(TileKey, String)>) -> CellId {
        let id = CellId::from_raw(self.cells.len() as u32);
        self.cells.push(Cell {
            cell_type,
            placement,
            pins: BTreeMap::new(),
        });
        id
    }

    /// Reserves `site` as a routethru; its pins become unavailable.
    pub fn mark_routethru(&mut self, site: TileKey) {
        self.routethru_sites.insert(site);
    }

    /// Whether `site` is reserved as a routethru.
    pub fn is_routethru(&self, site: TileKey) -> bool {
        self.routethru_sites.contains(&site)
    }

    /// Whether `site` hosts a committed cell.
    pub fn is_site_used(&self, site: TileKey) -> bool {
        self.used_sites.contains(&site)
    }

    /// Sites hosting committed cells.
    pub fn used_sites(&self) -> &BTreeSet<TileKey> {
        &self.used_sites
    }

    /// Sites reserved as routethrus.
    pub fn routethru_sites(&self) -> &BTreeSet<TileKey> {
        &self.routethru_sites
    }

    /// Cells in ordinal order.
    pub fn cells(&self) -> impl Iterator<Item = (CellId, &Cell)> {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, c)| (CellId::from_raw(i as u32), c))
    }

    /// Number of cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}
