//! Step definitions shared by the integration tests.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    convert::Infallible,
    sync::atomic::{AtomicUsize, Ordering},
};

use stepbind::{Registry, StepType, Steps, Table, World};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Colour {
    Blue,
    Black,
}

stepbind::token_param!(Colour { "blue" => Colour::Blue, "black" => Colour::Black });

#[derive(Debug, Default)]
pub struct Stock {
    pub black_jumpers: u32,
    pub garments: HashMap<Colour, u32>,
    pub bought: Option<Colour>,
}

impl World for Stock {
    type Error = Infallible;

    fn new() -> Result<Self, Self::Error> {
        Ok(Self::default())
    }

    fn steps(steps: &mut Steps<Self>) {
        _ = steps
            .given("I have (\\d+) black jumpers? left in stock", Self::has_jumpers)
            .when("he returns the jumper for a refund", |s: &mut Self| {
                s.black_jumpers += 1;
            })
            .then(
                "I should have (\\d+) black jumpers? in stock",
                |s: &mut Self, n: u32| {
                    assert_eq!(s.black_jumpers, n, "black jumpers in stock");
                },
            )
            .given(
                "that a customer buys a (blue|black) garment",
                |s: &mut Self, c: Colour| s.bought = Some(c),
            )
            .patterns(
                &[StepType::Given],
                [
                    "I have (\\d+) (blue|black) garments? in stock",
                    "there (?:is|are) (\\d+) (blue|black) garments? in stock",
                ],
                |s: &mut Self, n: u32, c: Colour| {
                    _ = s.garments.insert(c, n);
                },
            )
            .when(
                "he returns the garment for a replacement in (blue|black)",
                Self::replace,
            )
            .then(
                "I should have (\\d+) (blue|black) garments? in stock",
                |s: &mut Self, n: u32, c: Colour| {
                    assert_eq!(s.garments.get(&c).copied().unwrap_or(0), n);
                },
            );
    }
}

impl Stock {
    fn has_jumpers(&mut self, n: u32) {
        self.black_jumpers = n;
    }

    fn replace(&mut self, replacement: Colour) -> anyhow::Result<()> {
        let bought = self
            .bought
            .ok_or_else(|| anyhow::anyhow!("nothing was bought"))?;
        *self.garments.entry(bought).or_default() += 1;
        let left = self.garments.entry(replacement).or_default();
        *left = left
            .checked_sub(1)
            .ok_or_else(|| anyhow::anyhow!("no {replacement:?} garments left"))?;
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Mark {
    X,
    O,
}

stepbind::token_param!(Mark { "X" => Mark::X, "O" => Mark::O });

#[derive(Debug, Default)]
pub struct Board {
    pub cells: HashMap<(String, String), Mark>,
}

impl World for Board {
    type Error = Infallible;

    fn new() -> Result<Self, Self::Error> {
        Ok(Self::default())
    }

    fn steps(steps: &mut Steps<Self>) {
        _ = steps
            .given("an empty board", |b: &mut Self| b.cells.clear())
            .given("a board layout:", |b: &mut Self, layout: Table| {
                for row in layout.rows() {
                    let mark = match row.get("mark") {
                        Some("X") => Mark::X,
                        Some("O") => Mark::O,
                        other => panic!("unknown mark: {other:?}"),
                    };
                    let at = (
                        row.get("row").unwrap_or_default().to_owned(),
                        row.get("col").unwrap_or_default().to_owned(),
                    );
                    _ = b.cells.insert(at, mark);
                }
            })
            .when(
                "a player marks (X|O) at (top|middle|bottom) (left|centre|right)",
                |b: &mut Self, m: Mark, row: String, col: String| {
                    _ = b.cells.insert((row, col), m);
                },
            )
            .then(
                "the board should contain (\\d+) marks?",
                |b: &mut Self, n: usize| assert_eq!(b.cells.len(), n),
            )
            .then(
                "(X|O) should be at (top|middle|bottom) (left|centre|right)",
                |b: &mut Self, m: Mark, row: String, col: String| {
                    assert_eq!(b.cells.get(&(row, col)), Some(&m));
                },
            )
            .then("(X|O) should have won", |b: &mut Self, m: Mark| {
                assert!(b.has_won(m), "{m:?} hasn't won: {:?}", b.cells);
            });
    }
}

impl Board {
    fn has_won(&self, mark: Mark) -> bool {
        ["top", "middle", "bottom"].iter().any(|row| {
            ["left", "centre", "right"].iter().all(|col| {
                self.cells.get(&((*row).to_owned(), (*col).to_owned()))
                    == Some(&mark)
            })
        })
    }
}

/// Counts its own constructions, to observe which scenarios ran.
#[derive(Debug)]
pub struct Probe;

pub static PROBES: AtomicUsize = AtomicUsize::new(0);

impl World for Probe {
    type Error = Infallible;

    fn new() -> Result<Self, Self::Error> {
        _ = PROBES.fetch_add(1, Ordering::SeqCst);
        Ok(Self)
    }

    fn steps(steps: &mut Steps<Self>) {
        _ = steps.given("a probe", |_: &mut Self| {});
    }
}

pub fn stock() -> Registry {
    Registry::builder().world::<Stock>().build().unwrap()
}

pub fn board() -> Registry {
    Registry::builder().world::<Board>().build().unwrap()
}
