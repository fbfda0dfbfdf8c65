mod tests {
    use ws281x_link::{GammaCorrector, Rgb};

    #[test]
    fn test_identity() {
        let gamma = GammaCorrector::identity();
        for value in 0..=u8::MAX {
            assert_eq!(gamma.map(0, value), value);
            assert_eq!(gamma.map(2, value), value);
        }
        assert_eq!(GammaCorrector::with_exponent(1.0), gamma);
    }

    #[test]
    fn test_ws2812_curve() {
        let gamma = GammaCorrector::ws2812();
        assert_eq!(gamma.map(0, 0), 0);
        assert_eq!(gamma.map(0, 255), 255);
        assert!(gamma.map(0, 128) < 128);
        for value in 1..=u8::MAX {
            assert!(gamma.map(0, value - 1) <= gamma.map(0, value));
        }
    }

    #[test]
    fn test_per_channel_tables() {
        let gamma = GammaCorrector::with_channel_exponents(1.0, 2.0, 3.0);
        assert_eq!(gamma.map(0, 128), 128);
        assert_eq!(gamma.map(1, 128), 64);
        assert_eq!(gamma.map(2, 128), 32);
        // positions wrap every LED
        assert_eq!(gamma.map(4, 128), 64);

        assert_eq!(gamma.apply(Rgb::new(128, 128, 128)), Rgb::new(128, 64, 32));

        let mut bytes = [128, 128, 128, 255, 255, 255];
        gamma.apply_bytes(&mut bytes);
        assert_eq!(bytes, [128, 64, 32, 255, 255, 255]);
    }
}
