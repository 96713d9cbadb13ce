//! Keyboard adjacency graphs.
//!
//! Each graph maps a character to the keys physically around it, in a fixed
//! clockwise order so that the list index doubles as a direction. Every key
//! token holds the unshifted character first and the shifted one second
//! (`"2@"`); keypad tokens are single characters.

use std::collections::HashMap;
use std::sync::LazyLock;

const QWERTY: &str = r#"
`~ 1! 2@ 3# 4$ 5% 6^ 7& 8* 9( 0) -_ =+
    qQ wW eE rR tT yY uU iI oO pP [{ ]} \|
     aA sS dD fF gG hH jJ kK lL ;: '"
      zZ xX cC vV bB nN mM ,< .> /?
"#;

const DVORAK: &str = r#"
`~ 1! 2@ 3# 4$ 5% 6^ 7& 8* 9( 0) [{ ]}
    '" ,< .> pP yY fF gG cC rR lL /? =+ \|
     aA oO eE uU iI dD hH tT nN sS -_
      ;: qQ jJ kK xX bB mM wW vV zZ
"#;

const KEYPAD: &str = "
  / * -
7 8 9 +
4 5 6
1 2 3
  0 .
";

const MAC_KEYPAD: &str = "
  = / *
7 8 9 -
4 5 6 +
1 2 3
  0 .
";

/// One keyboard layout as an adjacency map.
#[derive(Debug, Clone)]
pub struct AdjacencyGraph {
    name: &'static str,
    keyboard: bool,
    neighbors: HashMap<char, Vec<Option<&'static str>>>,
}

impl AdjacencyGraph {
    /// Builds a graph from a layout drawing.
    ///
    /// Slanted layouts (keyboards) indent each row one column further than
    /// the last and give every key six neighbours; aligned layouts (keypads)
    /// give eight.
    fn from_layout(name: &'static str, layout: &'static str, slanted: bool) -> Self {
        let token_size = layout.split_whitespace().next().map_or(1, str::len);
        let x_unit = (token_size + 1) as i32;

        let mut positions: HashMap<(i32, i32), &'static str> = HashMap::new();
        for (y, line) in layout.split('\n').enumerate() {
            let y = y as i32;
            let slant = if slanted { y - 1 } else { 0 };
            for (offset, token) in tokens_with_offsets(line) {
                let shifted = offset as i32 - slant;
                debug_assert_eq!(shifted % x_unit, 0, "unexpected x offset for {token} in {name}");
                positions.insert((shifted / x_unit, y), token);
            }
        }

        let mut neighbors = HashMap::new();
        for (&(x, y), token) in &positions {
            let around: Vec<Option<&'static str>> = adjacent_coords(x, y, slanted)
                .into_iter()
                .map(|coord| positions.get(&coord).copied())
                .collect();
            for c in token.chars() {
                neighbors.insert(c, around.clone());
            }
        }

        Self {
            name,
            keyboard: slanted,
            neighbors,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether keys carry a shifted second character (qwerty, dvorak).
    pub fn is_keyboard(&self) -> bool {
        self.keyboard
    }

    /// Neighbours of `c` in direction order, empty when `c` is not on the layout.
    pub fn neighbors(&self, c: char) -> &[Option<&'static str>] {
        self.neighbors.get(&c).map_or(&[], Vec::as_slice)
    }

    /// Number of characters a pattern can start from.
    pub fn starting_positions(&self) -> usize {
        self.neighbors.len()
    }

    /// Mean number of present neighbours over all characters.
    pub fn average_degree(&self) -> f64 {
        if self.neighbors.is_empty() {
            return 0.0;
        }
        let total: usize = self
            .neighbors
            .values()
            .map(|adjacent| adjacent.iter().filter(|n| n.is_some()).count())
            .sum();
        total as f64 / self.neighbors.len() as f64
    }
}

fn tokens_with_offsets(line: &'static str) -> impl Iterator<Item = (usize, &'static str)> {
    line.split(' ')
        .scan(0usize, |position, piece| {
            let start = *position;
            *position += piece.len() + 1;
            Some((start, piece))
        })
        .filter(|(_, piece)| !piece.is_empty())
}

// clockwise from the key to the left
fn adjacent_coords(x: i32, y: i32, slanted: bool) -> Vec<(i32, i32)> {
    if slanted {
        vec![
            (x - 1, y),
            (x, y - 1),
            (x + 1, y - 1),
            (x + 1, y),
            (x, y + 1),
            (x - 1, y + 1),
        ]
    } else {
        vec![
            (x - 1, y),
            (x - 1, y - 1),
            (x, y - 1),
            (x + 1, y - 1),
            (x + 1, y),
            (x + 1, y + 1),
            (x, y + 1),
            (x - 1, y + 1),
        ]
    }
}

static GRAPHS: LazyLock<[AdjacencyGraph; 4]> = LazyLock::new(|| {
    [
        AdjacencyGraph::from_layout("qwerty", QWERTY, true),
        AdjacencyGraph::from_layout("dvorak", DVORAK, true),
        AdjacencyGraph::from_layout("keypad", KEYPAD, false),
        AdjacencyGraph::from_layout("mac_keypad", MAC_KEYPAD, false),
    ]
});

/// All graphs the spatial matcher walks, in matching order.
pub fn graphs() -> &'static [AdjacencyGraph] {
    GRAPHS.as_slice()
}

pub fn graph(name: &str) -> Option<&'static AdjacencyGraph> {
    graphs().iter().find(|g| g.name == name)
}
