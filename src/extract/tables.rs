//! Lookup tables for naive surface nets, indexed by the 8-bit corner mask.
//!
//! Corner `i` of a cell sits at offset `(i & 1, (i >> 1) & 1, (i >> 2) & 1)`.
//! A mask bit is set when that corner is solid (distance <= 0).

/// Corner pairs for the 12 cell edges: 4 along X, 4 along Y, 4 along Z.
pub const EDGES: [(usize, usize); 12] = [
    (0, 1), (2, 3), (4, 5), (6, 7),
    (0, 2), (1, 3), (4, 6), (5, 7),
    (0, 4), (1, 5), (2, 6), (3, 7),
];

/// Corner offsets in voxel units, matching the corner numbering above.
pub const CORNER_OFFSETS: [[f32; 3]; 8] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [0.0, 1.0, 1.0],
    [1.0, 1.0, 1.0],
];

/// Bit `e` set when edge `e` has one solid and one empty corner.
pub const EDGE_MASK: [u16; 256] = [
    0x000, 0x111, 0x221, 0x330, 0x412, 0x503, 0x633, 0x722,
    0x822, 0x933, 0xa03, 0xb12, 0xc30, 0xd21, 0xe11, 0xf00,
    0x144, 0x055, 0x365, 0x274, 0x556, 0x447, 0x777, 0x666,
    0x966, 0x877, 0xb47, 0xa56, 0xd74, 0xc65, 0xf55, 0xe44,
    0x284, 0x395, 0x0a5, 0x1b4, 0x696, 0x787, 0x4b7, 0x5a6,
    0xaa6, 0xbb7, 0x887, 0x996, 0xeb4, 0xfa5, 0xc95, 0xd84,
    0x3c0, 0x2d1, 0x1e1, 0x0f0, 0x7d2, 0x6c3, 0x5f3, 0x4e2,
    0xbe2, 0xaf3, 0x9c3, 0x8d2, 0xff0, 0xee1, 0xdd1, 0xcc0,
    0x448, 0x559, 0x669, 0x778, 0x05a, 0x14b, 0x27b, 0x36a,
    0xc6a, 0xd7b, 0xe4b, 0xf5a, 0x878, 0x969, 0xa59, 0xb48,
    0x50c, 0x41d, 0x72d, 0x63c, 0x11e, 0x00f, 0x33f, 0x22e,
    0xd2e, 0xc3f, 0xf0f, 0xe1e, 0x93c, 0x82d, 0xb1d, 0xa0c,
    0x6cc, 0x7dd, 0x4ed, 0x5fc, 0x2de, 0x3cf, 0x0ff, 0x1ee,
    0xeee, 0xfff, 0xccf, 0xdde, 0xafc, 0xbed, 0x8dd, 0x9cc,
    0x788, 0x699, 0x5a9, 0x4b8, 0x39a, 0x28b, 0x1bb, 0x0aa,
    0xfaa, 0xebb, 0xd8b, 0xc9a, 0xbb8, 0xaa9, 0x999, 0x888,
    0x888, 0x999, 0xaa9, 0xbb8, 0xc9a, 0xd8b, 0xebb, 0xfaa,
    0x0aa, 0x1bb, 0x28b, 0x39a, 0x4b8, 0x5a9, 0x699, 0x788,
    0x9cc, 0x8dd, 0xbed, 0xafc, 0xdde, 0xccf, 0xfff, 0xeee,
    0x1ee, 0x0ff, 0x3cf, 0x2de, 0x5fc, 0x4ed, 0x7dd, 0x6cc,
    0xa0c, 0xb1d, 0x82d, 0x93c, 0xe1e, 0xf0f, 0xc3f, 0xd2e,
    0x22e, 0x33f, 0x00f, 0x11e, 0x63c, 0x72d, 0x41d, 0x50c,
    0xb48, 0xa59, 0x969, 0x878, 0xf5a, 0xe4b, 0xd7b, 0xc6a,
    0x36a, 0x27b, 0x14b, 0x05a, 0x778, 0x669, 0x559, 0x448,
    0xcc0, 0xdd1, 0xee1, 0xff0, 0x8d2, 0x9c3, 0xaf3, 0xbe2,
    0x4e2, 0x5f3, 0x6c3, 0x7d2, 0x0f0, 0x1e1, 0x2d1, 0x3c0,
    0xd84, 0xc95, 0xfa5, 0xeb4, 0x996, 0x887, 0xbb7, 0xaa6,
    0x5a6, 0x4b7, 0x787, 0x696, 0x1b4, 0x0a5, 0x395, 0x284,
    0xe44, 0xf55, 0xc65, 0xd74, 0xa56, 0xb47, 0x877, 0x966,
    0x666, 0x777, 0x447, 0x556, 0x274, 0x365, 0x055, 0x144,
    0xf00, 0xe11, 0xd21, 0xc30, 0xb12, 0xa03, 0x933, 0x822,
    0x722, 0x633, 0x503, 0x412, 0x330, 0x221, 0x111, 0x000,];

/// Number of crossed edges, used to average the crossing points.
pub const EDGE_COUNT: [u8; 256] = [
    0, 3, 3, 4, 3, 4, 6, 5, 3, 6, 4, 5, 4, 5, 5, 4,
    3, 4, 6, 5, 6, 5, 9, 6, 6, 7, 7, 6, 7, 6, 8, 5,
    3, 6, 4, 5, 6, 7, 7, 6, 6, 9, 5, 6, 7, 8, 6, 5,
    4, 5, 5, 4, 7, 6, 8, 5, 7, 8, 6, 5, 8, 7, 7, 4,
    3, 6, 6, 7, 4, 5, 7, 6, 6, 9, 7, 8, 5, 6, 6, 5,
    4, 5, 7, 6, 5, 4, 8, 5, 7, 8, 8, 7, 6, 5, 7, 4,
    6, 9, 7, 8, 7, 8, 8, 7, 9, 12, 8, 9, 8, 9, 7, 6,
    5, 6, 6, 5, 6, 5, 7, 4, 8, 9, 7, 6, 7, 6, 6, 3,
    3, 6, 6, 7, 6, 7, 9, 8, 4, 7, 5, 6, 5, 6, 6, 5,
    6, 7, 9, 8, 9, 8, 12, 9, 7, 8, 8, 7, 8, 7, 9, 6,
    4, 7, 5, 6, 7, 8, 8, 7, 5, 8, 4, 5, 6, 7, 5, 4,
    5, 6, 6, 5, 8, 7, 9, 6, 6, 7, 5, 4, 7, 6, 6, 3,
    4, 7, 7, 8, 5, 6, 8, 7, 5, 8, 6, 7, 4, 5, 5, 4,
    5, 6, 8, 7, 6, 5, 9, 6, 6, 7, 7, 6, 5, 4, 6, 3,
    5, 8, 6, 7, 6, 7, 7, 6, 6, 9, 5, 6, 5, 6, 4, 3,
    4, 5, 5, 4, 5, 4, 6, 3, 5, 6, 4, 3, 4, 3, 3, 0,];

/// Quads completed by a cell. For axis `a` (0 = X, 1 = Y, 2 = Z) the edge
/// from corner 0 to corner `1 << a` is checked: bit `2a` is set when corner 0
/// is solid (quad faces `+a`), bit `2a + 1` when corner 0 is empty (quad faces
/// `-a`).
pub const QUAD_MASK: [u8; 256] = [
    0x00, 0x15, 0x02, 0x14, 0x08, 0x11, 0x0a, 0x10, 0x00, 0x15, 0x02, 0x14, 0x08, 0x11, 0x0a, 0x10,
    0x20, 0x05, 0x22, 0x04, 0x28, 0x01, 0x2a, 0x00, 0x20, 0x05, 0x22, 0x04, 0x28, 0x01, 0x2a, 0x00,
    0x00, 0x15, 0x02, 0x14, 0x08, 0x11, 0x0a, 0x10, 0x00, 0x15, 0x02, 0x14, 0x08, 0x11, 0x0a, 0x10,
    0x20, 0x05, 0x22, 0x04, 0x28, 0x01, 0x2a, 0x00, 0x20, 0x05, 0x22, 0x04, 0x28, 0x01, 0x2a, 0x00,
    0x00, 0x15, 0x02, 0x14, 0x08, 0x11, 0x0a, 0x10, 0x00, 0x15, 0x02, 0x14, 0x08, 0x11, 0x0a, 0x10,
    0x20, 0x05, 0x22, 0x04, 0x28, 0x01, 0x2a, 0x00, 0x20, 0x05, 0x22, 0x04, 0x28, 0x01, 0x2a, 0x00,
    0x00, 0x15, 0x02, 0x14, 0x08, 0x11, 0x0a, 0x10, 0x00, 0x15, 0x02, 0x14, 0x08, 0x11, 0x0a, 0x10,
    0x20, 0x05, 0x22, 0x04, 0x28, 0x01, 0x2a, 0x00, 0x20, 0x05, 0x22, 0x04, 0x28, 0x01, 0x2a, 0x00,
    0x00, 0x15, 0x02, 0x14, 0x08, 0x11, 0x0a, 0x10, 0x00, 0x15, 0x02, 0x14, 0x08, 0x11, 0x0a, 0x10,
    0x20, 0x05, 0x22, 0x04, 0x28, 0x01, 0x2a, 0x00, 0x20, 0x05, 0x22, 0x04, 0x28, 0x01, 0x2a, 0x00,
    0x00, 0x15, 0x02, 0x14, 0x08, 0x11, 0x0a, 0x10, 0x00, 0x15, 0x02, 0x14, 0x08, 0x11, 0x0a, 0x10,
    0x20, 0x05, 0x22, 0x04, 0x28, 0x01, 0x2a, 0x00, 0x20, 0x05, 0x22, 0x04, 0x28, 0x01, 0x2a, 0x00,
    0x00, 0x15, 0x02, 0x14, 0x08, 0x11, 0x0a, 0x10, 0x00, 0x15, 0x02, 0x14, 0x08, 0x11, 0x0a, 0x10,
    0x20, 0x05, 0x22, 0x04, 0x28, 0x01, 0x2a, 0x00, 0x20, 0x05, 0x22, 0x04, 0x28, 0x01, 0x2a, 0x00,
    0x00, 0x15, 0x02, 0x14, 0x08, 0x11, 0x0a, 0x10, 0x00, 0x15, 0x02, 0x14, 0x08, 0x11, 0x0a, 0x10,
    0x20, 0x05, 0x22, 0x04, 0x28, 0x01, 0x2a, 0x00, 0x20, 0x05, 0x22, 0x04, 0x28, 0x01, 0x2a, 0x00,];
